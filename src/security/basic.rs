//! HTTP Basic authentication against Jenkins.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::SecretString;
use url::Url;

use super::SecurityClient;
use super::probe::check_jenkins_security;
use crate::auth::{AuthScope, BasicCredentials, load_password_file};
use crate::client::{
    HttpTransport, MethodResponse, NetworkConfig, ResponseStream, Transport, TransportRequest,
};
use crate::{Error, Result};

/// Basic-auth security client.
///
/// `connect` loads the password file (if any), probes the server anonymously
/// when no credentials are configured, registers the credentials for the
/// target's host and port, and verifies them with a preemptive POST.
/// Afterwards `execute` and `execute_and_get_response_stream` reuse the
/// configured transport.
///
/// Status codes outside the checked sets pass through as success, both in
/// the handshake and in `execute`; they are only logged.
#[derive(Debug)]
pub struct BasicSecurityClient<T: Transport = HttpTransport> {
    target: Option<Url>,
    username: Option<String>,
    password_file: Option<PathBuf>,
    password: Option<SecretString>,
    transport: T,
}

impl BasicSecurityClient {
    /// Client over a default [`HttpTransport`].
    pub fn new(username: Option<String>, password_file: Option<PathBuf>) -> Result<Self> {
        Ok(Self::with_transport(
            HttpTransport::new()?,
            username,
            password_file,
        ))
    }

    pub fn builder() -> BasicSecurityClientBuilder {
        BasicSecurityClientBuilder::default()
    }
}

impl<T: Transport> BasicSecurityClient<T> {
    pub fn with_transport(
        transport: T,
        username: Option<String>,
        password_file: Option<PathBuf>,
    ) -> Self {
        Self {
            target: None,
            username,
            password_file,
            password: None,
            transport,
        }
    }

    /// Jenkins URL of the last `connect`.
    pub fn target(&self) -> Option<&Url> {
        self.target.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password_file(&self) -> Option<&Path> {
        self.password_file.as_deref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    async fn do_authentication(&mut self, target: &Url) -> Result<()> {
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            let scope = AuthScope::from_url(target)
                .ok_or_else(|| Error::Config(format!("Jenkins URL has no host: {}", target)))?;
            self.transport.state_mut().credentials.set_credentials(
                scope,
                BasicCredentials::new(username.clone(), password.clone()),
            );
        }

        let params = &mut self.transport.state_mut().params;
        params.authentication_preemptive = true;
        params.handle_redirects = false;

        let request = TransportRequest::post(target.clone())
            .do_authentication(true)
            .follow_redirects(false);
        let response = self.transport.execute(request).await?;
        let status = response.status();
        response.release();

        tracing::debug!(url = %target, status = status.as_u16(), "Authentication handshake finished");
        check_handshake_status(status)
    }

    async fn post(&self, url: &Url) -> Result<MethodResponse> {
        let response = self
            .transport
            .execute(TransportRequest::post(url.clone()))
            .await?;
        check_status_code(response.status(), url)?;
        Ok(response)
    }
}

#[async_trait]
impl<T: Transport> SecurityClient for BasicSecurityClient<T> {
    async fn connect(&mut self, jenkins_url: &Url) -> Result<()> {
        tracing::debug!(
            url = %jenkins_url,
            transport = self.transport.name(),
            username = self.username.as_deref().unwrap_or(""),
            "Connecting to Jenkins"
        );
        self.target = Some(jenkins_url.clone());

        if let Some(path) = &self.password_file {
            self.password = Some(load_password_file(path).await?);
        }

        if self.username.is_none() && self.password.is_none() {
            check_jenkins_security(&self.transport, jenkins_url).await?;
        }

        self.do_authentication(jenkins_url).await
    }

    async fn execute(&mut self, url: &Url) -> Result<String> {
        let response = self.post(url).await?;
        Ok(response.text().await?)
    }

    async fn execute_and_get_response_stream(&mut self, url: &Url) -> Result<ResponseStream> {
        let response = self.post(url).await?;
        Ok(response.into_stream())
    }
}

fn check_handshake_status(status: StatusCode) -> Result<()> {
    match status {
        StatusCode::OK => Ok(()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::FOUND => {
            Err(Error::BadCredentials {
                status: status.as_u16(),
            })
        }
        other => {
            tracing::warn!(
                status = other.as_u16(),
                "Unexpected handshake status, treating as authenticated"
            );
            Ok(())
        }
    }
}

fn check_status_code(status: StatusCode, url: &Url) -> Result<()> {
    match status {
        StatusCode::FORBIDDEN => Err(Error::Forbidden { url: url.clone() }),
        StatusCode::INTERNAL_SERVER_ERROR => Err(Error::ServerError { url: url.clone() }),
        other if !other.is_success() => {
            tracing::warn!(url = %url, status = other.as_u16(), "Returning non-success response body");
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Builder for [`BasicSecurityClient`] over an [`HttpTransport`].
#[derive(Debug, Default)]
pub struct BasicSecurityClientBuilder {
    username: Option<String>,
    password_file: Option<PathBuf>,
    network: NetworkConfig,
}

impl BasicSecurityClientBuilder {
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.password_file = Some(path.into());
        self
    }

    pub fn network(mut self, network: NetworkConfig) -> Self {
        self.network = network;
        self
    }

    pub async fn build(self) -> Result<BasicSecurityClient> {
        let transport = HttpTransport::from_config(&self.network).await?;
        Ok(BasicSecurityClient::with_transport(
            transport,
            self.username,
            self.password_file,
        ))
    }
}
