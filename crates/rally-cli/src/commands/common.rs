//! Shared wiring for command handlers: config resolution, client
//! construction, and small parsing/formatting helpers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use rally_core::backend::RestClient;
use rally_core::config::{ClientConfig, ConfigFile};
use rally_core::models::PlayerId;
use rally_core::realtime::RealtimeHub;

use crate::error::CliError;

/// Location of the config file: `--config-path`, or the platform config dir.
pub fn resolve_config_path(override_path: Option<PathBuf>) -> PathBuf {
    override_path.unwrap_or_else(|| {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rally")
            .join("config.json")
    })
}

/// Read the config file (tolerating its absence) with env overrides applied.
pub fn load_config_file(path: &Path) -> Result<ConfigFile, CliError> {
    let file = if path.exists() {
        ConfigFile::read(path)?
    } else {
        ConfigFile::default()
    };
    Ok(file.with_env_overrides())
}

/// Resolve the validated client config, mapping the missing-config case to
/// an actionable message.
pub fn resolve_client_config(path: &Path) -> Result<ClientConfig, CliError> {
    let file = load_config_file(path)?;
    if file == ConfigFile::default() {
        return Err(CliError::NotConfigured);
    }
    Ok(file.into_client_config()?)
}

/// The composition root: one client and one hub per invocation.
///
/// The CLI has no push transport, so the hub starts (and stays) silent; the
/// live views still register and tear down their subscriptions through it.
pub struct AppContext {
    pub config: ClientConfig,
    pub store: Arc<RestClient>,
    pub hub: RealtimeHub,
}

impl AppContext {
    pub fn build(config_path: &Path) -> Result<Self, CliError> {
        let config = resolve_client_config(config_path)?;
        tracing::debug!(backend = %config.backend_url, "connecting");
        let store = Arc::new(RestClient::new(&config)?);
        Ok(Self {
            config,
            store,
            hub: RealtimeHub::new(),
        })
    }

    pub const fn player(&self) -> PlayerId {
        self.config.player_id
    }
}

/// Parse a UTC timestamp in RFC 3339 or the short `YYYY-MM-DDTHH:MM` form.
pub fn parse_time(value: &str) -> Result<DateTime<Utc>, CliError> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(CliError::InvalidTime(value.to_string()))
}

/// Parse a player id argument.
pub fn parse_player_id(value: &str) -> Result<PlayerId, CliError> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::InvalidPlayerId(value.to_string()))
}

/// Render a timestamp for list output.
pub fn format_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M").to_string()
}
