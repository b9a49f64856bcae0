//! Profile management service

use std::sync::Arc;

use crate::backend::{Filter, Order, RowStore};
use crate::error::{Error, Result};
use crate::models::{PlayerId, Profile, ProfileDraft};
use crate::services::{row_to, rows_to};

const TABLE: &str = "profiles";

/// CRUD over player profiles.
pub struct ProfileService<S> {
    store: Arc<S>,
}

impl<S: RowStore> ProfileService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create or replace the profile owned by `draft.player_id`.
    ///
    /// The draft carries only the player-editable fields, so an update
    /// leaves the server-assigned `created_at` as it was.
    pub async fn upsert(&self, draft: &ProfileDraft) -> Result<Profile> {
        let payload = serde_json::to_value(draft)?;
        let filter = Filter::all().eq("player_id", draft.player_id.as_str());

        match self.store.update_row(TABLE, &filter, payload.clone()).await {
            Ok(row) => row_to(row),
            Err(Error::NotFound(_)) => row_to(self.store.insert_row(TABLE, payload).await?),
            Err(error) => Err(error),
        }
    }

    /// Fetch a profile by player id, `None` when absent.
    pub async fn get(&self, player: PlayerId) -> Result<Option<Profile>> {
        let filter = Filter::all().eq("player_id", player.as_str());
        let rows = self
            .store
            .fetch_rows(TABLE, &filter, &Order::asc("player_id"))
            .await?;
        Ok(rows_to::<Profile>(rows)?.into_iter().next())
    }
}
