use std::sync::Arc;

use serde::Serialize;

use rally_core::models::{AvailabilitySlot, SlotDraft};
use rally_core::services::AvailabilityService;

use crate::commands::common::{format_time, parse_time, AppContext};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct SlotListItem {
    id: i64,
    player_id: String,
    starts_at: String,
    ends_at: String,
    venue: String,
    note: Option<String>,
}

fn slot_to_item(slot: &AvailabilitySlot) -> SlotListItem {
    SlotListItem {
        id: slot.id.0,
        player_id: slot.player_id.as_str(),
        starts_at: slot.starts_at.to_rfc3339(),
        ends_at: slot.ends_at.to_rfc3339(),
        venue: slot.venue.clone(),
        note: slot.note.clone(),
    }
}

pub async fn run_add(
    context: &AppContext,
    from: &str,
    to: &str,
    venue: &str,
    note: Option<String>,
) -> Result<(), CliError> {
    let draft = SlotDraft::new(
        context.player(),
        parse_time(from)?,
        parse_time(to)?,
        venue,
        note,
    )?;

    let service = AvailabilityService::new(Arc::clone(&context.store));
    let slot = service.post(draft).await?;

    println!("{}", slot.id);
    Ok(())
}

pub async fn run_list(context: &AppContext, mine: bool, as_json: bool) -> Result<(), CliError> {
    let service = AvailabilityService::new(Arc::clone(&context.store));
    let slots = if mine {
        service.list_for(context.player()).await?
    } else {
        service.list_open().await?
    };

    if as_json {
        let items: Vec<SlotListItem> = slots.iter().map(slot_to_item).collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if slots.is_empty() {
        println!("No slots posted");
    } else {
        for slot in &slots {
            let note = slot
                .note
                .as_deref()
                .map(|note| format!("  ({note})"))
                .unwrap_or_default();
            println!(
                "{:>6}  {} - {}  {}{}",
                slot.id.0,
                format_time(slot.starts_at),
                format_time(slot.ends_at),
                slot.venue,
                note
            );
        }
    }
    Ok(())
}
