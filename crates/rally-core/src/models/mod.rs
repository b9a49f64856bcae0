//! Data models for Rally

mod matches;
mod message;
mod player;
mod slot;

pub use matches::{Match, MatchDecision, MatchId, MatchProposal, MatchStatus};
pub use message::{Message, MessageDraft, MessageId};
pub use player::{PlayerId, Profile, ProfileDraft, SkillLevel};
pub use slot::{AvailabilitySlot, SlotDraft, SlotId};
