use std::sync::Arc;

use rally_core::models::{ProfileDraft, SkillLevel};
use rally_core::services::ProfileService;

use crate::commands::common::{parse_player_id, AppContext};
use crate::error::CliError;

pub async fn run_set(
    context: &AppContext,
    name: &str,
    skill: &str,
    venue: Option<String>,
) -> Result<(), CliError> {
    let skill_level: SkillLevel = skill.parse()?;
    let draft = ProfileDraft::new(context.player(), name, skill_level, venue)?;

    let service = ProfileService::new(Arc::clone(&context.store));
    let saved = service.upsert(&draft).await?;

    println!("{} ({})", saved.display_name, saved.skill_level);
    Ok(())
}

pub async fn run_show(context: &AppContext, player_id: Option<&str>) -> Result<(), CliError> {
    let player = match player_id {
        Some(raw) => parse_player_id(raw)?,
        None => context.player(),
    };

    let service = ProfileService::new(Arc::clone(&context.store));
    match service.get(player).await? {
        Some(profile) => {
            println!("{}", profile.display_name);
            println!("  player:  {}", profile.player_id);
            println!("  skill:   {}", profile.skill_level);
            if let Some(venue) = &profile.home_venue {
                println!("  venue:   {venue}");
            }
        }
        None => println!("No profile for {player}"),
    }
    Ok(())
}
