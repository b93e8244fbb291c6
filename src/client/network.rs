//! Network configuration for timeouts, proxy, TLS and connection pool settings.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use super::TransportError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection pool configuration.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PoolConfig {
    #[serde(with = "duration_secs")]
    pub idle_timeout: Duration,
    pub max_idle_per_host: usize,
    #[serde(with = "option_duration_secs")]
    pub tcp_keepalive: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(90),
            max_idle_per_host: 8,
            tcp_keepalive: Some(Duration::from_secs(60)),
        }
    }
}

impl PoolConfig {
    pub fn minimal() -> Self {
        Self {
            idle_timeout: Duration::from_secs(30),
            max_idle_per_host: 2,
            tcp_keepalive: None,
        }
    }
}

/// Proxy server configuration.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProxyConfig {
    /// Proxy URL used for every scheme
    pub url: String,
    /// Hosts that bypass the proxy
    #[serde(default)]
    pub no_proxy: Vec<String>,
}

impl ProxyConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            no_proxy: Vec::new(),
        }
    }

    /// Add no-proxy patterns.
    pub fn no_proxy(mut self, patterns: impl IntoIterator<Item = String>) -> Self {
        self.no_proxy.extend(patterns);
        self
    }

    /// Apply to reqwest ClientBuilder.
    pub fn apply_to_builder(
        &self,
        builder: reqwest::ClientBuilder,
    ) -> Result<reqwest::ClientBuilder, TransportError> {
        let mut proxy = reqwest::Proxy::all(&self.url)?;
        if !self.no_proxy.is_empty() {
            proxy = proxy.no_proxy(reqwest::NoProxy::from_string(&self.no_proxy.join(",")));
        }
        Ok(builder.proxy(proxy))
    }
}

/// Network configuration for the HTTP transport.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Whole-request timeout
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    #[serde(with = "duration_secs")]
    pub connect_timeout: Duration,
    pub proxy: Option<ProxyConfig>,
    /// Extra CA certificate file (PEM)
    pub ca_cert: Option<PathBuf>,
    pub pool: Option<PoolConfig>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            proxy: None,
            ca_cert: None,
            pool: None,
        }
    }
}

impl NetworkConfig {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set proxy configuration.
    pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Set CA certificate path.
    pub fn ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert = Some(path.into());
        self
    }

    /// Set connection pool configuration.
    pub fn pool(mut self, pool: PoolConfig) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Apply configuration to reqwest ClientBuilder.
    pub async fn apply_to_builder(
        &self,
        mut builder: reqwest::ClientBuilder,
    ) -> Result<reqwest::ClientBuilder, TransportError> {
        builder = builder
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout);

        if let Some(ref proxy) = self.proxy {
            builder = proxy.apply_to_builder(builder)?;
        }

        if let Some(ref ca_path) = self.ca_cert {
            let cert_data = tokio::fs::read(ca_path).await?;
            let cert = reqwest::Certificate::from_pem(&cert_data)?;
            builder = builder.add_root_certificate(cert);
        }

        if let Some(ref pool) = self.pool {
            builder = builder
                .pool_idle_timeout(pool.idle_timeout)
                .pool_max_idle_per_host(pool.max_idle_per_host);

            if let Some(keepalive) = pool.tcp_keepalive {
                builder = builder.tcp_keepalive(keepalive);
            }
        }

        Ok(builder)
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

mod option_duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_config_builder() {
        let config = NetworkConfig::default()
            .timeout(Duration::from_secs(10))
            .proxy(ProxyConfig::new("http://proxy.example.com:3128"))
            .ca_cert("/path/to/ca.pem")
            .pool(PoolConfig::minimal());

        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert!(config.proxy.is_some());
        assert!(config.ca_cert.is_some());
        assert_eq!(config.pool.unwrap().max_idle_per_host, 2);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: NetworkConfig = serde_json::from_str(
            r#"{"timeout": 15, "proxy": {"url": "http://proxy:3128", "noProxy": ["localhost"]}}"#,
        )
        .unwrap();

        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(config.proxy.unwrap().no_proxy, vec!["localhost".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_ca_cert_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = NetworkConfig::default().ca_cert(dir.path().join("missing.pem"));

        let result = config.apply_to_builder(reqwest::Client::builder()).await;
        assert!(matches!(result, Err(TransportError::Io(_))));
    }
}
