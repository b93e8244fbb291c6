//! Transport error types.

use thiserror::Error;

/// Errors raised by a [`Transport`](super::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Reading a file needed by the transport failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Redirect target could not be resolved
    #[error("Invalid redirect location: {location}")]
    InvalidRedirect {
        /// Raw `Location` header value
        location: String,
    },

    /// Redirect limit reached
    #[error("Too many redirects (limit {limit})")]
    TooManyRedirects {
        /// Configured hop limit
        limit: usize,
    },

    /// Invalid transport configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl TransportError {
    /// Check if the failure happened while talking to the server
    pub fn is_connection_error(&self) -> bool {
        match self {
            TransportError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            TransportError::Io(_) => true,
            _ => false,
        }
    }

    /// Check if the request timed out
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Http(e) if e.is_timeout())
    }
}
