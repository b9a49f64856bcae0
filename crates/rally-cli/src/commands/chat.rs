use std::sync::Arc;

use serde::Serialize;

use rally_core::models::{MatchId, Message};
use rally_core::services::ChatThread;

use crate::commands::common::{format_time, AppContext};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct MessageListItem {
    id: i64,
    sender_id: String,
    body: String,
    sent_at: String,
}

fn message_to_item(message: &Message) -> MessageListItem {
    MessageListItem {
        id: message.id.0,
        sender_id: message.sender_id.as_str(),
        body: message.body.clone(),
        sent_at: message.sent_at.to_rfc3339(),
    }
}

pub async fn run_show(context: &AppContext, match_id: &str, as_json: bool) -> Result<(), CliError> {
    let match_id: MatchId = match_id.parse()?;
    let thread = ChatThread::open(
        Arc::clone(&context.store),
        &context.hub,
        context.player(),
        match_id,
    )
    .await?;

    if as_json {
        let items: Vec<MessageListItem> = thread.messages().iter().map(message_to_item).collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if thread.messages().is_empty() {
        println!("No messages in match {match_id}");
    } else {
        for message in thread.messages() {
            let who = if message.sender_id == context.player() {
                "me".to_string()
            } else {
                message.sender_id.to_string()
            };
            println!("[{}] {who}: {}", format_time(message.sent_at), message.body);
        }
    }
    Ok(())
}

pub async fn run_send(context: &AppContext, match_id: &str, body: &[String]) -> Result<(), CliError> {
    let match_id: MatchId = match_id.parse()?;
    let body = body.join(" ");
    if body.trim().is_empty() {
        return Err(CliError::EmptyBody);
    }

    let mut thread = ChatThread::open(
        Arc::clone(&context.store),
        &context.hub,
        context.player(),
        match_id,
    )
    .await?;
    let message = thread.send(body).await?;

    println!("{}", message.id);
    Ok(())
}
