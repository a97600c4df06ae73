//! Server configuration.

use netwatch_client::ProviderConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

use crate::error::{Result, ServerError};

/// Configuration for a netwatch API server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address (default: 0.0.0.0:3000).
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Provider endpoints, credentials and timeouts.
    #[serde(default)]
    pub providers: ProviderConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            providers: ProviderConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| ServerError::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}
