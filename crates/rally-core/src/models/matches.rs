//! Practice match model and its status workflow

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mirror::MirrorRow;
use crate::models::PlayerId;

/// Server-assigned identifier of a match.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct MatchId(pub i64);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MatchId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| Error::InvalidInput(format!("invalid match id '{s}'")))
    }
}

/// Lifecycle status of a match. Confirmed and Cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl MatchStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The opponent's one-time answer to a pending proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchDecision {
    Accept,
    Decline,
}

impl MatchDecision {
    /// Status the match moves to when this decision is applied.
    #[must_use]
    pub const fn target_status(self) -> MatchStatus {
        match self {
            Self::Accept => MatchStatus::Confirmed,
            Self::Decline => MatchStatus::Cancelled,
        }
    }
}

/// A proposed or agreed practice session between two players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub proposer_id: PlayerId,
    pub opponent_id: PlayerId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub venue: String,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
}

impl Match {
    /// Whether the given player is one of the two participants.
    #[must_use]
    pub fn involves(&self, player: PlayerId) -> bool {
        self.proposer_id == player || self.opponent_id == player
    }

    /// Check that `responder` may answer this proposal right now.
    ///
    /// Only the non-proposing participant may respond, exactly once, and
    /// only while the match is still pending.
    pub fn ensure_respondable(&self, responder: PlayerId) -> Result<()> {
        if self.status != MatchStatus::Pending {
            return Err(Error::InvalidTransition(format!(
                "match {} is already {}",
                self.id, self.status
            )));
        }
        if responder == self.proposer_id {
            return Err(Error::InvalidTransition(format!(
                "match {} can only be answered by the invited opponent",
                self.id
            )));
        }
        if responder != self.opponent_id {
            return Err(Error::InvalidTransition(format!(
                "player {responder} is not a participant of match {}",
                self.id
            )));
        }
        Ok(())
    }
}

impl MirrorRow for Match {
    fn row_id(&self) -> i64 {
        self.id.0
    }

    fn sort_key(&self) -> DateTime<Utc> {
        self.starts_at
    }
}

/// Insert payload for a new proposal; the backend assigns id, status and
/// `created_at` (status defaults to pending server-side).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchProposal {
    pub proposer_id: PlayerId,
    pub opponent_id: PlayerId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub venue: String,
}

impl MatchProposal {
    /// Build a proposal after presence checks.
    pub fn new(
        proposer_id: PlayerId,
        opponent_id: PlayerId,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        venue: impl Into<String>,
    ) -> Result<Self> {
        if proposer_id == opponent_id {
            return Err(Error::InvalidInput(
                "cannot propose a match against yourself".to_string(),
            ));
        }
        let venue = venue.into().trim().to_string();
        if venue.is_empty() {
            return Err(Error::InvalidInput("venue must not be empty".to_string()));
        }
        if ends_at <= starts_at {
            return Err(Error::InvalidInput(
                "match end must be after its start".to_string(),
            ));
        }
        Ok(Self {
            proposer_id,
            opponent_id,
            starts_at,
            ends_at,
            venue,
        })
    }
}
