//! Availability slot service

use std::sync::Arc;

use crate::backend::{Filter, Order, RowStore};
use crate::error::Result;
use crate::models::{AvailabilitySlot, PlayerId, SlotDraft};
use crate::services::{row_to, rows_to};

const TABLE: &str = "availability_slots";

/// Posting and listing of practice availability windows.
pub struct AvailabilityService<S> {
    store: Arc<S>,
}

impl<S: RowStore> AvailabilityService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Post a new slot; returns it as persisted.
    pub async fn post(&self, draft: SlotDraft) -> Result<AvailabilitySlot> {
        let payload = serde_json::to_value(&draft)?;
        let row = self.store.insert_row(TABLE, payload).await?;
        let slot: AvailabilitySlot = row_to(row)?;
        tracing::info!(slot = %slot.id, venue = %slot.venue, "posted availability slot");
        Ok(slot)
    }

    /// All posted slots, earliest first.
    pub async fn list_open(&self) -> Result<Vec<AvailabilitySlot>> {
        let rows = self
            .store
            .fetch_rows(TABLE, &Filter::all(), &Order::asc("starts_at"))
            .await?;
        rows_to(rows)
    }

    /// Slots posted by one player, earliest first.
    pub async fn list_for(&self, player: PlayerId) -> Result<Vec<AvailabilitySlot>> {
        let filter = Filter::all().eq("player_id", player.as_str());
        let rows = self
            .store
            .fetch_rows(TABLE, &filter, &Order::asc("starts_at"))
            .await?;
        rows_to(rows)
    }
}
