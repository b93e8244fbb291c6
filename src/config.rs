//! Security client configuration.
//!
//! ```json
//! {
//!   "username": "bob",
//!   "passwordFile": "/run/secrets/jenkins",
//!   "network": { "timeout": 60, "connectTimeout": 10 }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::client::NetworkConfig;
use crate::security::BasicSecurityClient;
use crate::{Error, Result};

/// Settings for a [`BasicSecurityClient`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SecurityConfig {
    pub username: Option<String>,
    pub password_file: Option<PathBuf>,
    pub network: NetworkConfig,
}

impl SecurityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

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

    pub fn validate(&self) -> Result<()> {
        if self.username.as_deref().is_some_and(str::is_empty) {
            return Err(Error::Config("username must not be empty".into()));
        }
        if self
            .password_file
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err(Error::Config("passwordFile must not be empty".into()));
        }
        Ok(())
    }

    pub async fn into_client(self) -> Result<BasicSecurityClient> {
        self.validate()?;
        let mut builder = BasicSecurityClient::builder().network(self.network);
        if let Some(username) = self.username {
            builder = builder.username(username);
        }
        if let Some(path) = self.password_file {
            builder = builder.password_file(path);
        }
        builder.build().await
    }
}
