//! Player identity and profile models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// A unique identifier for a player, assigned by the backend's auth service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(Uuid);

impl PlayerId {
    /// Create a fresh random player ID (used by tests and local tooling).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PlayerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Self-reported playing strength, coarse on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Casual,
    Club,
    Competitive,
}

impl SkillLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Casual => "casual",
            Self::Club => "club",
            Self::Competitive => "competitive",
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "casual" => Ok(Self::Casual),
            "club" => Ok(Self::Club),
            "competitive" => Ok(Self::Competitive),
            other => Err(Error::InvalidInput(format!(
                "unknown skill level '{other}' (expected beginner, casual, club or competitive)"
            ))),
        }
    }
}

/// A player's public profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Owning player; doubles as the row key.
    pub player_id: PlayerId,
    /// Display name shown to other players
    pub display_name: String,
    /// Self-reported skill level
    pub skill_level: SkillLevel,
    /// Preferred venue, free text
    #[serde(default)]
    pub home_venue: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Write payload for a profile; the backend assigns `created_at` on insert,
/// and an update never touches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileDraft {
    pub player_id: PlayerId,
    pub display_name: String,
    pub skill_level: SkillLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_venue: Option<String>,
}

impl ProfileDraft {
    /// Build a profile draft after presence checks on the display name.
    pub fn new(
        player_id: PlayerId,
        display_name: impl Into<String>,
        skill_level: SkillLevel,
        home_venue: Option<String>,
    ) -> Result<Self> {
        let display_name = display_name.into().trim().to_string();
        if display_name.is_empty() {
            return Err(Error::InvalidInput(
                "display name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            player_id,
            display_name,
            skill_level,
            home_venue: crate::util::normalize_text_option(home_venue),
        })
    }
}
