use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] rally_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid time '{0}' (expected RFC 3339 or YYYY-MM-DDTHH:MM, UTC)")]
    InvalidTime(String),
    #[error("No message body provided")]
    EmptyBody,
    #[error("Invalid player id '{0}'")]
    InvalidPlayerId(String),
    #[error(
        "Rally is not configured. Run `rally config init --backend-url <URL> --api-key <KEY> --player-id <ID>` first."
    )]
    NotConfigured,
}
