pub mod chat;
pub mod common;
pub mod config;
pub mod matches;
pub mod profile;
pub mod slots;
