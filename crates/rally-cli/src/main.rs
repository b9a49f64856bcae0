//! Rally CLI - find table-tennis practice partners from the command line

mod cli;
mod commands;
mod error;

use clap::Parser;

use cli::{ChatCommands, Cli, Commands, ConfigCommands, MatchCommands, ProfileCommands, SlotCommands};
use commands::common::{resolve_config_path, AppContext};
use error::CliError;
use rally_core::models::MatchDecision;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rally=info".parse().expect("static directive")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config_path);

    match cli.command {
        Commands::Config { command } => match command {
            ConfigCommands::Init {
                backend_url,
                api_key,
                access_token,
                player_id,
            } => commands::config::run_init(
                &config_path,
                backend_url,
                api_key,
                access_token,
                player_id,
            )?,
            ConfigCommands::Show => commands::config::run_show(&config_path)?,
        },
        Commands::Profile { command } => {
            let context = AppContext::build(&config_path)?;
            match command {
                ProfileCommands::Set { name, skill, venue } => {
                    commands::profile::run_set(&context, &name, &skill, venue).await?;
                }
                ProfileCommands::Show { player_id } => {
                    commands::profile::run_show(&context, player_id.as_deref()).await?;
                }
            }
        }
        Commands::Slots { command } => {
            let context = AppContext::build(&config_path)?;
            match command {
                SlotCommands::Add {
                    from,
                    to,
                    venue,
                    note,
                } => commands::slots::run_add(&context, &from, &to, &venue, note).await?,
                SlotCommands::List { mine, json } => {
                    commands::slots::run_list(&context, mine, json).await?;
                }
            }
        }
        Commands::Match { command } => {
            let context = AppContext::build(&config_path)?;
            match command {
                MatchCommands::Propose {
                    opponent,
                    from,
                    to,
                    venue,
                } => commands::matches::run_propose(&context, &opponent, &from, &to, &venue).await?,
                MatchCommands::Accept { id } => {
                    commands::matches::run_respond(&context, &id, MatchDecision::Accept).await?;
                }
                MatchCommands::Decline { id } => {
                    commands::matches::run_respond(&context, &id, MatchDecision::Decline).await?;
                }
                MatchCommands::List { json } => {
                    commands::matches::run_list(&context, json).await?;
                }
            }
        }
        Commands::Chat { command } => {
            let context = AppContext::build(&config_path)?;
            match command {
                ChatCommands::Show { match_id, json } => {
                    commands::chat::run_show(&context, &match_id, json).await?;
                }
                ChatCommands::Send { match_id, body } => {
                    commands::chat::run_send(&context, &match_id, &body).await?;
                }
            }
        }
    }

    Ok(())
}
