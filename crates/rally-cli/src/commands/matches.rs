use std::sync::Arc;

use serde::Serialize;

use rally_core::models::{Match, MatchDecision, MatchId, MatchProposal};
use rally_core::services::MatchService;

use crate::commands::common::{format_time, parse_player_id, parse_time, AppContext};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct MatchListItem {
    id: i64,
    proposer_id: String,
    opponent_id: String,
    starts_at: String,
    ends_at: String,
    venue: String,
    status: String,
}

fn match_to_item(m: &Match) -> MatchListItem {
    MatchListItem {
        id: m.id.0,
        proposer_id: m.proposer_id.as_str(),
        opponent_id: m.opponent_id.as_str(),
        starts_at: m.starts_at.to_rfc3339(),
        ends_at: m.ends_at.to_rfc3339(),
        venue: m.venue.clone(),
        status: m.status.to_string(),
    }
}

pub async fn run_propose(
    context: &AppContext,
    opponent: &str,
    from: &str,
    to: &str,
    venue: &str,
) -> Result<(), CliError> {
    let proposal = MatchProposal::new(
        context.player(),
        parse_player_id(opponent)?,
        parse_time(from)?,
        parse_time(to)?,
        venue,
    )?;

    let service = MatchService::new(Arc::clone(&context.store));
    let proposed = service.propose(proposal).await?;

    println!("{} ({})", proposed.id, proposed.status);
    Ok(())
}

pub async fn run_respond(
    context: &AppContext,
    id: &str,
    decision: MatchDecision,
) -> Result<(), CliError> {
    let id: MatchId = id.parse()?;

    let service = MatchService::new(Arc::clone(&context.store));
    let current = service.get(id).await?;
    let updated = service.respond(&current, context.player(), decision).await?;

    println!("{} ({})", updated.id, updated.status);
    Ok(())
}

pub async fn run_list(context: &AppContext, as_json: bool) -> Result<(), CliError> {
    let service = MatchService::new(Arc::clone(&context.store));
    let matches = service.matches_for(context.player()).await?;

    if as_json {
        let items: Vec<MatchListItem> = matches.iter().map(match_to_item).collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if matches.is_empty() {
        println!("No matches yet");
    } else {
        for m in &matches {
            let role = if m.proposer_id == context.player() {
                "vs"
            } else {
                "from"
            };
            let other = if m.proposer_id == context.player() {
                m.opponent_id
            } else {
                m.proposer_id
            };
            println!(
                "{:>6}  {} - {}  {}  {role} {other}  [{}]",
                m.id.0,
                format_time(m.starts_at),
                format_time(m.ends_at),
                m.venue,
                m.status
            );
        }
    }
    Ok(())
}
