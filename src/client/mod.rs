//! HTTP transport used by the security clients.
//!
//! A [`Transport`] executes [`TransportRequest`]s and owns the mutable
//! [`TransportState`]: the credential store and the protocol parameters that
//! decide when credentials are sent and whether redirects are followed.

pub mod error;
pub mod http;
pub mod network;
pub mod response;
#[cfg(test)]
pub(crate) mod testing;

pub use error::TransportError;
pub use http::HttpTransport;
pub use network::{NetworkConfig, PoolConfig, ProxyConfig};
pub use response::{BodyStream, ConnectionLease, MethodResponse, ResponseStream};

use std::fmt::Debug;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::HeaderValue;
use url::Url;

use crate::auth::CredentialStore;

pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Client-wide protocol parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportParams {
    /// Send credentials on the first request instead of waiting for a 401 challenge.
    pub authentication_preemptive: bool,
    /// Follow redirects for requests that do not decide for themselves.
    pub handle_redirects: bool,
    pub max_redirects: usize,
}

impl Default for TransportParams {
    fn default() -> Self {
        Self {
            authentication_preemptive: false,
            handle_redirects: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

/// Credentials and parameters shared by every request of a transport.
#[derive(Clone, Debug, Default)]
pub struct TransportState {
    pub credentials: CredentialStore,
    pub params: TransportParams,
}

impl TransportState {
    /// `Authorization` header to send up front for `request`, if any.
    pub fn preemptive_authorization(&self, request: &TransportRequest) -> Option<HeaderValue> {
        if !request.do_authentication || !self.params.authentication_preemptive {
            return None;
        }
        self.authorization_for(&request.url)
    }

    /// `Authorization` header for whatever credentials are scoped to `url`.
    pub fn authorization_for(&self, url: &Url) -> Option<HeaderValue> {
        self.credentials
            .credentials_for(url)
            .map(|c| c.authorization_header())
    }

    pub fn follows_redirects(&self, request: &TransportRequest) -> bool {
        request
            .follow_redirects
            .unwrap_or(self.params.handle_redirects)
    }
}

/// One request to execute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    /// Attach credentials scoped to the target.
    pub do_authentication: bool,
    /// Per-request redirect policy; `None` defers to [`TransportParams::handle_redirects`].
    pub follow_redirects: Option<bool>,
}

impl TransportRequest {
    /// Authenticated POST.
    pub fn post(url: Url) -> Self {
        Self {
            method: Method::POST,
            url,
            do_authentication: true,
            follow_redirects: None,
        }
    }

    /// Anonymous GET.
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            do_authentication: false,
            follow_redirects: None,
        }
    }

    pub fn do_authentication(mut self, enabled: bool) -> Self {
        self.do_authentication = enabled;
        self
    }

    pub fn follow_redirects(mut self, enabled: bool) -> Self {
        self.follow_redirects = Some(enabled);
        self
    }
}

/// HTTP transport with a credential store and protocol parameters.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    fn state(&self) -> &TransportState;

    fn state_mut(&mut self) -> &mut TransportState;

    /// Execute a request and return its response with the connection still held.
    async fn execute(&self, request: TransportRequest) -> Result<MethodResponse, TransportError>;

    /// Transport name for logging/debugging.
    fn name(&self) -> &'static str;
}
