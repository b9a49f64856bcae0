//! Match proposal and response service

use std::sync::Arc;

use serde_json::json;

use crate::backend::{Filter, Order, RowStore};
use crate::error::{Error, Result};
use crate::models::{Match, MatchDecision, MatchId, MatchProposal, MatchStatus, PlayerId};
use crate::services::{row_to, rows_to};

pub(crate) const TABLE: &str = "matches";

/// Proposal and accept/decline workflow over matches.
pub struct MatchService<S> {
    store: Arc<S>,
}

impl<S: RowStore> MatchService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Propose a practice session; returns the pending match as persisted.
    pub async fn propose(&self, proposal: MatchProposal) -> Result<Match> {
        let payload = serde_json::to_value(&proposal)?;
        let row = self.store.insert_row(TABLE, payload).await?;
        let proposed: Match = row_to(row)?;
        tracing::info!(
            id = %proposed.id,
            opponent = %proposed.opponent_id,
            "proposed match"
        );
        Ok(proposed)
    }

    /// Answer a pending proposal as `responder`.
    ///
    /// The transition rules are checked locally before any request is
    /// issued, and the update is additionally guarded by a
    /// `status = pending` filter so a concurrent answer cannot apply twice.
    pub async fn respond(
        &self,
        current: &Match,
        responder: PlayerId,
        decision: MatchDecision,
    ) -> Result<Match> {
        current.ensure_respondable(responder)?;

        let filter = Filter::all()
            .eq("id", current.id.0)
            .eq("status", MatchStatus::Pending.as_str());
        let patch = json!({ "status": decision.target_status() });

        let row = self
            .store
            .update_row(TABLE, &filter, patch)
            .await
            .map_err(|error| match error {
                Error::NotFound(_) => Error::InvalidTransition(format!(
                    "match {} was already answered",
                    current.id
                )),
                other => other,
            })?;
        let updated: Match = row_to(row)?;
        tracing::info!(id = %updated.id, status = %updated.status, "match answered");
        Ok(updated)
    }

    /// Fetch one match by id.
    pub async fn get(&self, id: MatchId) -> Result<Match> {
        let filter = Filter::all().eq("id", id.0);
        let rows = self
            .store
            .fetch_rows(TABLE, &filter, &Order::asc("id"))
            .await?;
        rows_to::<Match>(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("match {id}")))
    }

    /// All matches involving `player`, earliest start first.
    pub async fn matches_for(&self, player: PlayerId) -> Result<Vec<Match>> {
        let filter = participant_filter(player);
        let rows = self
            .store
            .fetch_rows(TABLE, &filter, &Order::asc("starts_at"))
            .await?;
        rows_to(rows)
    }
}

/// Filter selecting the matches a player takes part in, on either side.
pub(crate) fn participant_filter(player: PlayerId) -> Filter {
    Filter::all().any_eq(&["proposer_id", "opponent_id"], player.as_str())
}
