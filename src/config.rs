//! Endpoint configuration file loading with environment variable overrides.
//!
//! Credentials are deliberately absent: they arrive on the command line for
//! every invocation and are never read from or written to disk.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Upstream endpoint settings.
    #[serde(default)]
    pub endpoint: EndpointConfig,
}

/// Where and how to reach the upstream visual API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// API host.
    pub host: String,
    /// URL scheme, `https` unless pointing at a local stub.
    pub scheme: String,
    /// Signing region.
    pub region: String,
    /// Signing service name.
    pub service: String,
    /// API version sent with every action.
    pub version: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            host: "visual.volcengineapi.com".to_string(),
            scheme: "https".to_string(),
            region: "cn-north-1".to_string(),
            service: "cv".to_string(),
            version: "2022-08-31".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// The effective endpoint, with `DREAMGEN_HOST` taking precedence over the file.
    #[must_use]
    pub fn endpoint(&self) -> EndpointConfig {
        let mut endpoint = self.endpoint.clone();
        if let Some(host) = std::env::var("DREAMGEN_HOST").ok().filter(|h| !h.is_empty()) {
            endpoint.host = host;
        }
        endpoint
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `DREAMGEN_CONFIG` environment variable
/// 3. `~/.config/dreamgen/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("DREAMGEN_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/dreamgen/config.toml")
    } else {
        PathBuf::from("dreamgen.toml")
    }
}
