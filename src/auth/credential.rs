//! Credential types.

use std::collections::HashMap;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

/// Host and port a credential is bound to.
///
/// The port is always concrete: a URL without an explicit port resolves to
/// its scheme's default port.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AuthScope {
    host: String,
    port: u16,
}

impl AuthScope {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into().to_ascii_lowercase(),
            port,
        }
    }

    /// Scope of the server a URL points at, if the URL has a host and port.
    pub fn from_url(url: &Url) -> Option<Self> {
        let host = url.host_str()?;
        let port = url.port_or_known_default()?;
        Some(Self::new(host, port))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn matches(&self, url: &Url) -> bool {
        Self::from_url(url).as_ref() == Some(self)
    }
}

impl fmt::Display for AuthScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Username and password for HTTP Basic authentication.
#[derive(Clone)]
pub struct BasicCredentials {
    username: String,
    password: SecretString,
}

impl BasicCredentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }

    /// `Authorization` header value: `Basic base64(username:password)`.
    pub fn authorization_header(&self) -> HeaderValue {
        let token = STANDARD.encode(format!(
            "{}:{}",
            self.username,
            self.password.expose_secret()
        ));
        // Base64 output is always a valid header value.
        let mut value = HeaderValue::from_str(&format!("Basic {}", token))
            .unwrap_or_else(|_| HeaderValue::from_static("Basic"));
        value.set_sensitive(true);
        value
    }
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Credentials keyed by the scope they may be sent to.
#[derive(Clone, Debug, Default)]
pub struct CredentialStore {
    entries: HashMap<AuthScope, BasicCredentials>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register credentials for a scope, replacing any previous entry.
    pub fn set_credentials(&mut self, scope: AuthScope, credentials: BasicCredentials) {
        tracing::debug!(scope = %scope, username = %credentials.username(), "Registered credentials");
        self.entries.insert(scope, credentials);
    }

    pub fn get(&self, scope: &AuthScope) -> Option<&BasicCredentials> {
        self.entries.get(scope)
    }

    /// Credentials that may be sent to `url`.
    pub fn credentials_for(&self, url: &Url) -> Option<&BasicCredentials> {
        AuthScope::from_url(url).and_then(|scope| self.entries.get(&scope))
    }

    pub fn scopes(&self) -> impl Iterator<Item = &AuthScope> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_scope_from_url_uses_default_port() {
        let scope = AuthScope::from_url(&url("http://jenkins.local/job/x")).unwrap();
        assert_eq!(scope.host(), "jenkins.local");
        assert_eq!(scope.port(), 80);

        let scope = AuthScope::from_url(&url("https://ci.example.com")).unwrap();
        assert_eq!(scope.port(), 443);
    }

    #[test]
    fn test_scope_matches_exact_host_and_port() {
        let scope = AuthScope::new("jenkins.local", 8080);
        assert!(scope.matches(&url("http://jenkins.local:8080/api/json")));
        assert!(scope.matches(&url("http://JENKINS.local:8080/")));
        assert!(!scope.matches(&url("http://jenkins.local:8081/")));
        assert!(!scope.matches(&url("http://jenkins.local/")));
        assert!(!scope.matches(&url("http://evil.example.com:8080/")));
    }

    #[test]
    fn test_authorization_header() {
        let creds = BasicCredentials::new("bob", SecretString::from("secret"));
        let header = creds.authorization_header();
        assert_eq!(header.to_str().unwrap(), "Basic Ym9iOnNlY3JldA==");
        assert!(header.is_sensitive());
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = BasicCredentials::new("bob", SecretString::from("hunter2"));
        let debug = format!("{:?}", creds);
        assert!(debug.contains("bob"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_store_lookup_by_url() {
        let mut store = CredentialStore::new();
        store.set_credentials(
            AuthScope::new("jenkins.local", 8080),
            BasicCredentials::new("bob", SecretString::from("secret")),
        );

        assert_eq!(store.len(), 1);
        assert!(
            store
                .credentials_for(&url("http://jenkins.local:8080/job/a"))
                .is_some()
        );
        assert!(store.credentials_for(&url("http://other:8080/")).is_none());
    }
}
