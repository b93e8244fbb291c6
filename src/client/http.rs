//! reqwest-backed transport.

use std::io;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, HeaderValue, LOCATION, WWW_AUTHENTICATE};
use reqwest::redirect::Policy;
use reqwest::{Method, StatusCode};
use url::Url;

use super::network::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT};
use super::{
    ConnectionLease, MethodResponse, NetworkConfig, Transport, TransportError, TransportRequest,
    TransportState,
};

/// Transport over a pooled [`reqwest::Client`].
///
/// Redirects are handled here, not by reqwest, so that the transport's
/// parameters decide whether they are followed and credentials are resolved
/// again for every hop.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    http: reqwest::Client,
    state: TransportState,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .redirect(Policy::none())
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;
        Ok(Self::with_http(http))
    }

    pub async fn from_config(config: &NetworkConfig) -> Result<Self, TransportError> {
        let builder = reqwest::Client::builder().redirect(Policy::none());
        let http = config.apply_to_builder(builder).await?.build()?;
        Ok(Self::with_http(http))
    }

    /// Wrap an existing client. It must be built with `redirect::Policy::none()`.
    pub fn with_http(http: reqwest::Client) -> Self {
        Self {
            http,
            state: TransportState::default(),
        }
    }

    async fn send(
        &self,
        method: &Method,
        url: &Url,
        authorization: Option<HeaderValue>,
    ) -> Result<reqwest::Response, TransportError> {
        let mut builder = self.http.request(method.clone(), url.clone());
        if *method == Method::POST {
            builder = builder.header(CONTENT_LENGTH, 0);
        }
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        Ok(builder.send().await?)
    }

    /// Send one hop, answering a Basic challenge when credentials were not sent up front.
    async fn send_hop(&self, hop: &TransportRequest) -> Result<reqwest::Response, TransportError> {
        let preemptive = self.state.preemptive_authorization(hop);
        let sent_credentials = preemptive.is_some();
        let response = self.send(&hop.method, &hop.url, preemptive).await?;

        if hop.do_authentication
            && !sent_credentials
            && response.status() == StatusCode::UNAUTHORIZED
            && is_basic_challenge(&response)
            && let Some(authorization) = self.state.authorization_for(&hop.url)
        {
            tracing::debug!(url = %hop.url, "Answering Basic challenge");
            drop(response);
            return self.send(&hop.method, &hop.url, Some(authorization)).await;
        }

        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn state(&self) -> &TransportState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut TransportState {
        &mut self.state
    }

    async fn execute(&self, request: TransportRequest) -> Result<MethodResponse, TransportError> {
        let follow = self.state.follows_redirects(&request);
        let limit = self.state.params.max_redirects;
        let mut hop = request;
        let mut hops = 0;

        loop {
            tracing::debug!(method = %hop.method, url = %hop.url, "Executing request");
            let response = self.send_hop(&hop).await?;
            let status = response.status();

            if follow
                && status.is_redirection()
                && let Some(location) = response.headers().get(LOCATION)
            {
                if hops >= limit {
                    return Err(TransportError::TooManyRedirects { limit });
                }
                let location = String::from_utf8_lossy(location.as_bytes()).into_owned();
                let next = hop
                    .url
                    .join(&location)
                    .map_err(|_| TransportError::InvalidRedirect { location })?;

                tracing::debug!(status = status.as_u16(), from = %hop.url, to = %next, "Following redirect");
                if !matches!(
                    status,
                    StatusCode::TEMPORARY_REDIRECT | StatusCode::PERMANENT_REDIRECT
                ) {
                    hop.method = Method::GET;
                }
                hop.url = next;
                hops += 1;
                continue;
            }

            return Ok(into_method_response(response, hop.url));
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

fn is_basic_challenge(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| {
            v.trim_start()
                .get(..5)
                .is_some_and(|scheme| scheme.eq_ignore_ascii_case("basic"))
        })
}

fn into_method_response(response: reqwest::Response, url: Url) -> MethodResponse {
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.bytes_stream().map_err(io::Error::other).boxed();
    MethodResponse::new(status, headers, body, ConnectionLease::new(url))
}
