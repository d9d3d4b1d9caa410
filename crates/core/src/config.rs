//! Configuration types shared across crates.

use crate::block::AddressBlock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ipam: IpamConfig,
}

impl AppConfig {
    /// Validate configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        self.ipam.validate()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// PUT lifecycle responses to the event's ResponseURL (default: true).
    /// Turn off when the caller only reads the HTTP response body.
    #[serde(default = "default_deliver_responses")]
    pub deliver_responses: bool,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_deliver_responses() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            deliver_responses: default_deliver_responses(),
        }
    }
}

/// IPAM authority configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IpamConfig {
    /// NetBox REST API.
    Netbox {
        /// Base URL of the NetBox instance (e.g., "https://netbox.example.com/").
        url: String,
        /// Where to read the API token from.
        #[serde(default)]
        token: TokenSource,
        /// Per-request timeout in seconds.
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    /// In-process authority (testing and local development only).
    /// Nothing survives a restart.
    Memory {
        /// Parent blocks registered at startup.
        #[serde(default)]
        prefixes: Vec<AddressBlock>,
    },
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for IpamConfig {
    fn default() -> Self {
        Self::Netbox {
            url: "http://localhost:8000/".to_string(),
            token: TokenSource::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl IpamConfig {
    /// Validate IPAM configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            IpamConfig::Netbox {
                url, timeout_secs, ..
            } => {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(format!("ipam.url must be an http(s) URL, got {url:?}"));
                }
                if *timeout_secs == 0 {
                    return Err("ipam.timeout_secs must be greater than zero".to_string());
                }
                Ok(())
            }
            IpamConfig::Memory { prefixes } => {
                for (i, a) in prefixes.iter().enumerate() {
                    if prefixes[..i].contains(a) {
                        return Err(format!("ipam.prefixes lists {a} more than once"));
                    }
                }
                Ok(())
            }
        }
    }

    /// Request timeout for remote backends.
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            IpamConfig::Netbox { timeout_secs, .. } => Some(Duration::from_secs(*timeout_secs)),
            IpamConfig::Memory { .. } => None,
        }
    }
}

/// API token source.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TokenSource {
    /// Token read from an environment variable.
    Env {
        /// Environment variable name.
        #[serde(default = "default_token_var")]
        var: String,
    },
    /// Token stored in a file (e.g., a mounted secret).
    File {
        /// Path to the token file.
        path: PathBuf,
    },
    /// Token provided directly (NOT recommended outside development).
    Value {
        /// The token itself.
        token: String,
    },
}

fn default_token_var() -> String {
    "NETBOX_TOKEN".to_string()
}

impl Default for TokenSource {
    fn default() -> Self {
        Self::Env {
            var: default_token_var(),
        }
    }
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Env { var } => f.debug_struct("Env").field("var", var).finish(),
            Self::File { path } => f.debug_struct("File").field("path", path).finish(),
            Self::Value { .. } => f.debug_struct("Value").field("token", &"<redacted>").finish(),
        }
    }
}

impl TokenSource {
    /// Read the token. Surrounding whitespace is dropped; an empty token is an
    /// error.
    pub fn resolve(&self) -> crate::Result<String> {
        let raw = match self {
            Self::Env { var } => std::env::var(var).map_err(|_| {
                crate::Error::Config(format!("token environment variable not set: {var}"))
            })?,
            Self::File { path } => std::fs::read_to_string(path).map_err(|e| {
                crate::Error::Config(format!(
                    "failed to read token file {}: {e}",
                    path.display()
                ))
            })?,
            Self::Value { token } => token.clone(),
        };
        let token = raw.trim();
        if token.is_empty() {
            return Err(crate::Error::Config("API token is empty".to_string()));
        }
        Ok(token.to_string())
    }
}
