//! # jenkins-security
//!
//! Security clients for talking to a Jenkins server: HTTP Basic
//! authentication with preemptive credentials, plus an anonymous probe that
//! tells "needs credentials" apart from "not Jenkins at all".
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jenkins_security::{BasicSecurityClient, SecurityClient};
//! use url::Url;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), jenkins_security::Error> {
//!     let mut client = BasicSecurityClient::new(Some("bob".into()), Some("/run/secrets/jenkins".into()))?;
//!     let jenkins = Url::parse("http://jenkins.local:8080/").expect("valid url");
//!
//!     client.connect(&jenkins).await?;
//!     let json = client.execute(&jenkins.join("api/json").expect("valid url")).await?;
//!     println!("{}", json);
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod auth;
pub mod client;
pub mod config;
pub mod prelude;
pub mod security;

use std::path::PathBuf;

use url::Url;

pub use auth::{AuthScope, BasicCredentials, CredentialStore};
pub use client::{
    HttpTransport, MethodResponse, NetworkConfig, PoolConfig, ProxyConfig, ResponseStream,
    Transport, TransportError, TransportParams, TransportRequest, TransportState,
};
pub use config::SecurityConfig;
pub use security::{BasicSecurityClient, BasicSecurityClientBuilder, JENKINS_HEADER, SecurityClient};

/// Error type for jenkins-security operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The anonymous probe could not reach the server.
    #[error("Failed to connect to {url}: {source}")]
    ConnectionFailed {
        url: Url,
        #[source]
        source: TransportError,
    },

    /// The server refused anonymous access and no credentials were given.
    #[error("This Jenkins server requires authentication: {url}")]
    AuthenticationRequired { url: Url },

    /// The server did not identify itself as Jenkins.
    #[error("This URL doesn't look like Jenkins: {url}")]
    NotJenkins { url: Url },

    /// The authentication handshake was rejected.
    #[error("Bad credentials (HTTP {status})")]
    BadCredentials { status: u16 },

    /// An authenticated request was refused.
    #[error("Forbidden: {url}")]
    Forbidden { url: Url },

    /// An authenticated request hit a server error.
    #[error("Server internal error: {url}")]
    ServerError { url: Url },

    /// The password file could not be read.
    #[error("Failed to read password file {}: {source}", path.display())]
    PasswordFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport failure outside the anonymous probe.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Error category for unified error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing, rejected or insufficient credentials
    Authentication,
    /// Server unreachable or not a Jenkins server
    Connectivity,
    /// Server-side failure
    Server,
    /// Configuration or local file errors
    Configuration,
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::AuthenticationRequired { .. }
            | Error::BadCredentials { .. }
            | Error::Forbidden { .. } => ErrorCategory::Authentication,

            Error::ConnectionFailed { .. } | Error::NotJenkins { .. } | Error::Transport(_) => {
                ErrorCategory::Connectivity
            }

            Error::ServerError { .. } => ErrorCategory::Server,

            Error::PasswordFile { .. } | Error::Config(_) => ErrorCategory::Configuration,
        }
    }

    pub fn is_authentication_error(&self) -> bool {
        self.category() == ErrorCategory::Authentication
    }

    pub fn is_connectivity_error(&self) -> bool {
        self.category() == ErrorCategory::Connectivity
    }

    pub fn is_configuration_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    /// HTTP status behind the error, when one was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::BadCredentials { status } => Some(*status),
            Error::AuthenticationRequired { .. } | Error::Forbidden { .. } => Some(403),
            Error::ServerError { .. } => Some(500),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
