//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use url::Url;

use super::{
    ConnectionLease, MethodResponse, Transport, TransportError, TransportRequest, TransportState,
};

#[derive(Debug)]
pub enum MockReply {
    Response {
        status: u16,
        headers: Vec<(&'static str, &'static str)>,
        body: String,
    },
    Fail(io::ErrorKind),
}

impl MockReply {
    pub fn status(status: u16) -> Self {
        MockReply::Response {
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn jenkins(status: u16) -> Self {
        Self::status(status).header("X-Jenkins", "2.440.3")
    }

    pub fn header(mut self, name: &'static str, value: &'static str) -> Self {
        if let MockReply::Response { headers, .. } = &mut self {
            headers.push((name, value));
        }
        self
    }

    pub fn body(mut self, text: &str) -> Self {
        if let MockReply::Response { body, .. } = &mut self {
            *body = text.to_string();
        }
        self
    }
}

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: Url,
    pub authorization: Option<String>,
    pub follow_redirects: bool,
}

/// Transport that answers from a queue of scripted replies and counts
/// acquired and released connections.
#[derive(Debug, Default)]
pub struct MockTransport {
    state: TransportState,
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<RecordedRequest>>,
    acquired: AtomicUsize,
    released: Arc<AtomicUsize>,
}

impl MockTransport {
    pub fn new(replies: impl IntoIterator<Item = MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn state(&self) -> &TransportState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut TransportState {
        &mut self.state
    }

    async fn execute(&self, request: TransportRequest) -> Result<MethodResponse, TransportError> {
        let authorization = self
            .state
            .preemptive_authorization(&request)
            .and_then(|v| v.to_str().ok().map(str::to_string));
        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method.clone(),
            url: request.url.clone(),
            authorization,
            follow_redirects: self.state.follows_redirects(&request),
        });

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(MockReply::Fail(io::ErrorKind::ConnectionRefused));

        let (status, headers, body) = match reply {
            MockReply::Response {
                status,
                headers,
                body,
            } => (status, headers, body),
            MockReply::Fail(kind) => return Err(TransportError::Io(io::Error::from(kind))),
        };

        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            header_map.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_static(value),
            );
        }

        self.acquired.fetch_add(1, Ordering::SeqCst);
        let released = Arc::clone(&self.released);
        Ok(MethodResponse::new(
            StatusCode::from_u16(status).unwrap(),
            header_map,
            futures::stream::iter(vec![Ok::<_, io::Error>(Bytes::from(body))]).boxed(),
            ConnectionLease::with_release_hook(request.url, move || {
                released.fetch_add(1, Ordering::SeqCst);
            }),
        ))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
