//! Availability slot model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::PlayerId;

/// Server-assigned identifier of an availability slot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SlotId(pub i64);

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A posted window of time during which a player wants to practice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub id: SlotId,
    pub player_id: PlayerId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub venue: String,
    #[serde(default)]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new slot; the backend assigns id and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotDraft {
    pub player_id: PlayerId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub venue: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl SlotDraft {
    /// Build a slot draft after presence checks.
    pub fn new(
        player_id: PlayerId,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        venue: impl Into<String>,
        note: Option<String>,
    ) -> Result<Self> {
        let venue = venue.into().trim().to_string();
        if venue.is_empty() {
            return Err(Error::InvalidInput("venue must not be empty".to_string()));
        }
        if ends_at <= starts_at {
            return Err(Error::InvalidInput(
                "slot end must be after its start".to_string(),
            ));
        }
        Ok(Self {
            player_id,
            starts_at,
            ends_at,
            venue,
            note: crate::util::normalize_text_option(note),
        })
    }
}
