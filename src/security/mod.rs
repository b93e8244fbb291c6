//! Security clients for Jenkins servers.
//!
//! A [`SecurityClient`] connects to a Jenkins server once, verifying that it
//! can authenticate, and then executes authenticated requests against it.

mod basic;
mod probe;

pub use basic::{BasicSecurityClient, BasicSecurityClientBuilder};
pub use probe::{JENKINS_HEADER, check_jenkins_security};

use std::fmt::Debug;

use async_trait::async_trait;
use url::Url;

use crate::Result;
use crate::client::ResponseStream;

/// Capability contract of a Jenkins security client.
///
/// Every operation takes `&mut self`: an instance drives one session at a
/// time.
#[async_trait]
pub trait SecurityClient: Send + Debug {
    /// Verify access to the Jenkins server at `jenkins_url` and remember it as the target.
    async fn connect(&mut self, jenkins_url: &Url) -> Result<()>;

    /// POST to `url` and return the whole response body.
    async fn execute(&mut self, url: &Url) -> Result<String>;

    /// POST to `url` and return the body as a stream.
    ///
    /// The stream holds the connection until it is dropped.
    async fn execute_and_get_response_stream(&mut self, url: &Url) -> Result<ResponseStream>;
}
