//! Anonymous security probe.

use reqwest::StatusCode;
use url::Url;

use crate::client::{Transport, TransportRequest};
use crate::{Error, Result};

/// Response header every Jenkins server sends with its version.
pub const JENKINS_HEADER: &str = "X-Jenkins";

/// Classify an unauthenticated server before the real handshake runs.
///
/// Sends an anonymous GET that follows redirects. Fails with
/// [`Error::AuthenticationRequired`] on 403, [`Error::NotJenkins`] when the
/// response has no `X-Jenkins` header, and [`Error::ConnectionFailed`] when
/// the server cannot be reached.
pub async fn check_jenkins_security<T>(transport: &T, url: &Url) -> Result<()>
where
    T: Transport + ?Sized,
{
    tracing::debug!(url = %url, "Probing Jenkins security anonymously");

    let request = TransportRequest::get(url.clone())
        .do_authentication(false)
        .follow_redirects(true);
    let response = transport
        .execute(request)
        .await
        .map_err(|source| Error::ConnectionFailed {
            url: url.clone(),
            source,
        })?;

    if response.status() == StatusCode::FORBIDDEN {
        return Err(Error::AuthenticationRequired { url: url.clone() });
    }

    match response.header(JENKINS_HEADER) {
        Some(version) => {
            tracing::debug!(url = %url, version, "Jenkins allows anonymous access");
            Ok(())
        }
        None => Err(Error::NotJenkins { url: url.clone() }),
    }
}
