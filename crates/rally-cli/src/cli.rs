use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rally")]
#[command(about = "Find practice partners for table tennis from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to the config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure the backend connection
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Manage your player profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Post and browse availability slots
    Slots {
        #[command(subcommand)]
        command: SlotCommands,
    },
    /// Propose and answer practice matches
    Match {
        #[command(subcommand)]
        command: MatchCommands,
    },
    /// Chat with your match partner
    Chat {
        #[command(subcommand)]
        command: ChatCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update the config file
    Init {
        /// Backend base URL
        #[arg(long, value_name = "URL")]
        backend_url: Option<String>,
        /// Public API key
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,
        /// Bearer token of the signed-in player
        #[arg(long, value_name = "TOKEN")]
        access_token: Option<String>,
        /// Your player id
        #[arg(long, value_name = "ID")]
        player_id: Option<String>,
    },
    /// Show the effective configuration (secrets redacted)
    Show,
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Create or update your profile
    Set {
        /// Display name shown to other players
        #[arg(long, value_name = "NAME")]
        name: String,
        /// Skill level: beginner, casual, club or competitive
        #[arg(long, value_name = "LEVEL", default_value = "casual")]
        skill: String,
        /// Preferred venue
        #[arg(long, value_name = "VENUE")]
        venue: Option<String>,
    },
    /// Show a profile (your own when no id is given)
    Show {
        /// Player id to look up
        player_id: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SlotCommands {
    /// Post an availability slot
    Add {
        /// Start of the window (UTC, e.g. 2025-06-01T18:00)
        #[arg(long, value_name = "TIME")]
        from: String,
        /// End of the window
        #[arg(long, value_name = "TIME")]
        to: String,
        /// Where you want to play
        #[arg(long, value_name = "VENUE")]
        venue: String,
        /// Free-text note
        #[arg(long, value_name = "TEXT")]
        note: Option<String>,
    },
    /// List availability slots, earliest first
    List {
        /// Only your own slots
        #[arg(long)]
        mine: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum MatchCommands {
    /// Propose a practice match to another player
    Propose {
        /// Opponent's player id
        #[arg(long, value_name = "ID")]
        opponent: String,
        /// Start of the session (UTC, e.g. 2025-06-01T18:00)
        #[arg(long, value_name = "TIME")]
        from: String,
        /// End of the session
        #[arg(long, value_name = "TIME")]
        to: String,
        /// Where to play
        #[arg(long, value_name = "VENUE")]
        venue: String,
    },
    /// Accept a pending proposal
    Accept {
        /// Match id
        id: String,
    },
    /// Decline a pending proposal
    Decline {
        /// Match id
        id: String,
    },
    /// List your matches, earliest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ChatCommands {
    /// Show the chat of a match, oldest first
    Show {
        /// Match id
        match_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Send a message to a match chat
    Send {
        /// Match id
        match_id: String,
        /// Message body
        body: Vec<String>,
    },
}
