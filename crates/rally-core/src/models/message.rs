//! Chat message model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mirror::MirrorRow;
use crate::models::{MatchId, PlayerId};

/// Server-assigned identifier of a chat message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct MessageId(pub i64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single chat entry belonging to one match. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub match_id: MatchId,
    pub sender_id: PlayerId,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

impl MirrorRow for Message {
    fn row_id(&self) -> i64 {
        self.id.0
    }

    fn sort_key(&self) -> DateTime<Utc> {
        self.sent_at
    }
}

/// Insert payload for a new message; the backend assigns id and `sent_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageDraft {
    pub match_id: MatchId,
    pub sender_id: PlayerId,
    pub body: String,
}

impl MessageDraft {
    /// Build a message draft after a presence check on the body.
    pub fn new(match_id: MatchId, sender_id: PlayerId, body: impl Into<String>) -> Result<Self> {
        let body = body.into().trim().to_string();
        if body.is_empty() {
            return Err(Error::InvalidInput(
                "message body must not be empty".to_string(),
            ));
        }
        Ok(Self {
            match_id,
            sender_id,
            body,
        })
    }
}
