//! Client configuration.
//!
//! Rally talks to one managed backend per process. The connection settings
//! live in a JSON config file written by the CLI, with `RALLY_*` environment
//! variables taking precedence. The access token is acquired elsewhere
//! (auth is the backend's concern) and only carried here.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::PlayerId;
use crate::util::{is_http_url, normalize_text_option};

/// Raw, unvalidated config file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub backend_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub player_id: Option<String>,
}

impl ConfigFile {
    /// Parse a config file payload.
    pub fn parse(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Read and parse a config file from disk.
    pub fn read(path: &Path) -> Result<Self> {
        let payload = std::fs::read_to_string(path)?;
        Self::parse(&payload)
    }

    /// Write the config file to disk, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(self)?;
        std::fs::write(path, payload)?;
        Ok(())
    }

    /// Overlay `RALLY_*` environment variables onto the file values.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        for (key, slot) in [
            ("RALLY_BACKEND_URL", &mut self.backend_url),
            ("RALLY_API_KEY", &mut self.api_key),
            ("RALLY_ACCESS_TOKEN", &mut self.access_token),
            ("RALLY_PLAYER_ID", &mut self.player_id),
        ] {
            if let Some(value) = normalize_text_option(std::env::var(key).ok()) {
                *slot = Some(value);
            }
        }
        self
    }

    /// Validate into a usable [`ClientConfig`].
    pub fn into_client_config(self) -> Result<ClientConfig> {
        let backend_url = normalize_text_option(self.backend_url)
            .ok_or_else(|| Error::Config("backend_url is required".to_string()))?;
        if !is_http_url(&backend_url) {
            return Err(Error::Config(
                "backend_url must include http:// or https://".to_string(),
            ));
        }

        let api_key = normalize_text_option(self.api_key)
            .ok_or_else(|| Error::Config("api_key is required".to_string()))?;

        let player_id = normalize_text_option(self.player_id)
            .ok_or_else(|| Error::Config("player_id is required".to_string()))?
            .parse::<PlayerId>()
            .map_err(|error| Error::Config(format!("invalid player_id: {error}")))?;

        Ok(ClientConfig {
            backend_url: backend_url.trim_end_matches('/').to_string(),
            api_key,
            access_token: normalize_text_option(self.access_token),
            player_id,
        })
    }
}

/// Validated connection settings for one backend.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL, no trailing slash.
    pub backend_url: String,
    /// Public API key sent with every request.
    pub api_key: String,
    /// Bearer token of the signed-in player, when present.
    pub access_token: Option<String>,
    /// The player this client acts as.
    pub player_id: PlayerId,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ClientConfig")
            .field("backend_url", &self.backend_url)
            .field("api_key", &"[REDACTED]")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("player_id", &self.player_id)
            .finish()
    }
}
