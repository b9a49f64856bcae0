//! rally-core - Core library for Rally
//!
//! This crate contains the shared models, backend row client, realtime
//! change plumbing, and the local mirror synchronizer used by all Rally
//! interfaces.

pub mod backend;
pub mod config;
pub mod error;
pub mod mirror;
pub mod models;
pub mod realtime;
pub mod services;
pub mod util;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};
pub use models::{Match, MatchId, Message, MessageId, PlayerId};
