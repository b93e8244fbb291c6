//! Executed requests and the connections they hold.
//!
//! A [`MethodResponse`] owns one pooled connection through its
//! [`ConnectionLease`]. The lease is released exactly once, when it is
//! dropped: after [`MethodResponse::text`] has read the body, on
//! [`MethodResponse::release`], or when a [`ResponseStream`] handed out by
//! [`MethodResponse::into_stream`] is dropped by the caller.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use tokio_util::io::StreamReader;
use url::Url;

use super::TransportError;

/// Body chunks of a response.
pub type BodyStream = BoxStream<'static, io::Result<Bytes>>;

type ReleaseHook = Box<dyn FnOnce() + Send + Sync>;

/// Guard for one request's connection.
pub struct ConnectionLease {
    url: Url,
    on_release: Option<ReleaseHook>,
}

impl ConnectionLease {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            on_release: None,
        }
    }

    /// Lease that runs `hook` when released.
    pub fn with_release_hook(url: Url, hook: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            url,
            on_release: Some(Box::new(hook)),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Drop for ConnectionLease {
    fn drop(&mut self) {
        if let Some(hook) = self.on_release.take() {
            hook();
        }
        tracing::trace!(url = %self.url, "Connection released");
    }
}

impl fmt::Debug for ConnectionLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionLease")
            .field("url", &self.url.as_str())
            .finish()
    }
}

/// Status, headers and unread body of an executed request.
pub struct MethodResponse {
    status: StatusCode,
    headers: HeaderMap,
    // Declared before `lease` so the body is dropped first.
    body: BodyStream,
    lease: ConnectionLease,
}

impl MethodResponse {
    pub fn new(
        status: StatusCode,
        headers: HeaderMap,
        body: BodyStream,
        lease: ConnectionLease,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            lease,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if present and valid text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn url(&self) -> &Url {
        self.lease.url()
    }

    /// Read the whole body as text and release the connection.
    ///
    /// Invalid UTF-8 sequences are replaced with U+FFFD.
    pub async fn text(mut self) -> Result<String, TransportError> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.body.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Hand the body and its connection over to the caller.
    pub fn into_stream(self) -> ResponseStream {
        ResponseStream {
            status: self.status,
            body: self.body,
            lease: self.lease,
        }
    }

    /// Discard the body and release the connection.
    pub fn release(self) {}
}

impl fmt::Debug for MethodResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("lease", &self.lease)
            .finish_non_exhaustive()
    }
}

/// Streaming response body that owns its connection.
///
/// Dropping the stream releases the connection; callers must not hold on to
/// it longer than needed.
pub struct ResponseStream {
    status: StatusCode,
    body: BodyStream,
    lease: ConnectionLease,
}

impl ResponseStream {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn url(&self) -> &Url {
        self.lease.url()
    }

    /// Adapt into an [`AsyncRead`](tokio::io::AsyncRead).
    pub fn into_async_read(self) -> StreamReader<Self, Bytes> {
        StreamReader::new(self)
    }
}

impl Stream for ResponseStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.body.poll_next_unpin(cx)
    }
}

impl fmt::Debug for ResponseStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseStream")
            .field("status", &self.status)
            .field("lease", &self.lease)
            .finish_non_exhaustive()
    }
}
