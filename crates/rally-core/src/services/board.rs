//! Live view of the matches involving the current player.

use std::sync::Arc;

use crate::backend::{Order, RowStore};
use crate::error::Result;
use crate::mirror::Mirror;
use crate::models::{Match, MatchDecision, MatchId, MatchProposal, PlayerId};
use crate::realtime::{decode_change, RealtimeHub, Subscription};
use crate::services::matches::{participant_filter, TABLE};
use crate::services::{rows_to, MatchService};

/// A [`Mirror`] of the player's matches kept current from the push feed.
///
/// `open` establishes the baseline and the subscription; the write paths
/// (`propose`, `respond`) apply their results locally so the acting player
/// sees them without waiting for the echo, which the mirror's seen-set then
/// absorbs.
pub struct MatchBoard<S> {
    service: MatchService<S>,
    store: Arc<S>,
    hub: RealtimeHub,
    player: PlayerId,
    mirror: Mirror<Match>,
    subscription: Option<Subscription>,
}

impl<S: RowStore> MatchBoard<S> {
    pub fn new(store: Arc<S>, hub: RealtimeHub, player: PlayerId) -> Self {
        Self {
            service: MatchService::new(Arc::clone(&store)),
            store,
            hub,
            player,
            mirror: Mirror::new(),
            subscription: None,
        }
    }

    /// Subscribe and load the snapshot baseline.
    ///
    /// The new subscription registers before the snapshot fetch so nothing
    /// published while the fetch is in flight is missed; overlaps are
    /// absorbed by the mirror's seen-set. On success any previous
    /// subscription is torn down, so a stale feed can never mutate the new
    /// sequence. A failed fetch drops the new registration and leaves prior
    /// state untouched.
    pub async fn open(&mut self) -> Result<()> {
        let filter = participant_filter(self.player);
        let subscription = self.hub.subscribe(TABLE, filter.clone());

        let rows = self
            .store
            .fetch_rows(TABLE, &filter, &Order::asc("starts_at"))
            .await?;
        let rows = rows_to(rows)?;

        self.close();
        self.subscription = Some(subscription);
        self.mirror.load_initial(rows);
        Ok(())
    }

    /// Propose a match and show it on the board immediately.
    pub async fn propose(&mut self, proposal: MatchProposal) -> Result<Match> {
        let proposed = self.service.propose(proposal).await?;
        self.mirror.apply_local_insert(proposed.clone());
        Ok(proposed)
    }

    /// Answer a pending proposal and update the board in place.
    pub async fn respond(&mut self, id: MatchId, decision: MatchDecision) -> Result<Match> {
        let current = self.service.get(id).await?;
        let updated = self.service.respond(&current, self.player, decision).await?;
        self.mirror
            .apply_remote_change(crate::mirror::Change::Update(updated.clone()));
        Ok(updated)
    }

    /// Apply every already-delivered pushed change; returns how many were
    /// applied (undecodable records are dropped and not counted).
    pub fn pump(&mut self) -> usize {
        let Some(subscription) = self.subscription.as_mut() else {
            return 0;
        };
        let mut applied = 0;
        while let Some(record) = subscription.try_recv() {
            if let Some(change) = decode_change::<Match>(&record) {
                self.mirror.apply_remote_change(change);
                applied += 1;
            }
        }
        applied
    }

    /// Await one pushed change and apply it; `false` once the feed is gone.
    pub async fn apply_next(&mut self) -> bool {
        let Some(subscription) = self.subscription.as_mut() else {
            return false;
        };
        while let Some(record) = subscription.recv().await {
            if let Some(change) = decode_change::<Match>(&record) {
                self.mirror.apply_remote_change(change);
                return true;
            }
        }
        false
    }

    /// Tear down the subscription and clear the board.
    pub fn close(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.mirror.reset();
    }

    /// The visible matches, ascending by start time.
    #[must_use]
    pub fn matches(&self) -> &[Match] {
        self.mirror.rows()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::models::MatchStatus;
    use crate::realtime::{ChangeRecord, EventType};
    use crate::testing::MemoryStore;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap()
    }

    fn match_row(m: &Match) -> serde_json::Value {
        serde_json::to_value(m).unwrap()
    }

    fn insert_record(row: serde_json::Value) -> ChangeRecord {
        ChangeRecord {
            event_type: EventType::Insert,
            new: Some(row),
            old: None,
        }
    }

    #[tokio::test]
    async fn proposal_is_visible_once_despite_echo() {
        let store = Arc::new(MemoryStore::new());
        let hub = RealtimeHub::new();
        let me = PlayerId::new();
        let mut board = MatchBoard::new(Arc::clone(&store), hub.clone(), me);
        board.open().await.unwrap();

        let proposed = board
            .propose(MatchProposal::new(me, PlayerId::new(), at(18), at(19), "Hall").unwrap())
            .await
            .unwrap();
        assert_eq!(board.matches().len(), 1);

        // The backend echoes the insert over the push feed.
        hub.publish(TABLE, &insert_record(match_row(&proposed)));
        board.pump();

        assert_eq!(board.matches().len(), 1);
    }

    #[tokio::test]
    async fn pushed_proposal_from_opponent_appears() {
        let store = Arc::new(MemoryStore::new());
        let hub = RealtimeHub::new();
        let me = PlayerId::new();
        let mut board = MatchBoard::new(Arc::clone(&store), hub.clone(), me);
        board.open().await.unwrap();

        // Another client proposes a match against us.
        let service = MatchService::new(Arc::clone(&store));
        let incoming = service
            .propose(MatchProposal::new(PlayerId::new(), me, at(18), at(19), "Hall").unwrap())
            .await
            .unwrap();
        hub.publish(TABLE, &insert_record(match_row(&incoming)));

        assert_eq!(board.pump(), 1);
        assert_eq!(board.matches().len(), 1);
        assert_eq!(board.matches()[0].id, incoming.id);
    }

    #[tokio::test]
    async fn matches_not_involving_the_player_never_arrive() {
        let store = Arc::new(MemoryStore::new());
        let hub = RealtimeHub::new();
        let mut board = MatchBoard::new(Arc::clone(&store), hub.clone(), PlayerId::new());
        board.open().await.unwrap();

        let service = MatchService::new(Arc::clone(&store));
        let unrelated = service
            .propose(
                MatchProposal::new(PlayerId::new(), PlayerId::new(), at(18), at(19), "Hall")
                    .unwrap(),
            )
            .await
            .unwrap();
        hub.publish(TABLE, &insert_record(match_row(&unrelated)));

        assert_eq!(board.pump(), 0);
        assert!(board.matches().is_empty());
    }

    #[tokio::test]
    async fn respond_updates_the_board_in_place() {
        let store = Arc::new(MemoryStore::new());
        let hub = RealtimeHub::new();
        let me = PlayerId::new();
        let mut board = MatchBoard::new(Arc::clone(&store), hub.clone(), me);

        let service = MatchService::new(Arc::clone(&store));
        let incoming = service
            .propose(MatchProposal::new(PlayerId::new(), me, at(18), at(19), "Hall").unwrap())
            .await
            .unwrap();
        board.open().await.unwrap();
        assert_eq!(board.matches()[0].status, MatchStatus::Pending);

        board.respond(incoming.id, MatchDecision::Accept).await.unwrap();

        assert_eq!(board.matches().len(), 1);
        assert_eq!(board.matches()[0].status, MatchStatus::Confirmed);
    }

    #[tokio::test]
    async fn malformed_records_are_dropped() {
        let store = Arc::new(MemoryStore::new());
        let hub = RealtimeHub::new();
        let me = PlayerId::new();
        let mut board = MatchBoard::new(Arc::clone(&store), hub.clone(), me);
        board.open().await.unwrap();

        hub.publish(
            TABLE,
            &insert_record(json!({"proposer_id": me.as_str(), "no_id": true})),
        );

        assert_eq!(board.pump(), 0);
        assert!(board.matches().is_empty());
    }

    #[tokio::test]
    async fn reopen_tears_down_the_previous_subscription() {
        let store = Arc::new(MemoryStore::new());
        let hub = RealtimeHub::new();
        let mut board = MatchBoard::new(Arc::clone(&store), hub.clone(), PlayerId::new());

        board.open().await.unwrap();
        assert_eq!(hub.subscription_count(), 1);

        board.open().await.unwrap();
        assert_eq!(hub.subscription_count(), 1);

        board.close();
        assert_eq!(hub.subscription_count(), 0);
        assert!(board.matches().is_empty());
    }

    #[tokio::test]
    async fn failed_reopen_preserves_prior_state() {
        let store = Arc::new(MemoryStore::new());
        let hub = RealtimeHub::new();
        let me = PlayerId::new();
        let mut board = MatchBoard::new(Arc::clone(&store), hub.clone(), me);

        let service = MatchService::new(Arc::clone(&store));
        let incoming = service
            .propose(MatchProposal::new(PlayerId::new(), me, at(18), at(19), "Hall").unwrap())
            .await
            .unwrap();
        board.open().await.unwrap();
        assert_eq!(board.matches().len(), 1);

        store.fail_next_fetch();
        assert!(board.open().await.is_err());

        // The baseline and the original subscription survive the failed
        // reload; the aborted attempt's registration is gone.
        assert_eq!(board.matches().len(), 1);
        assert_eq!(board.matches()[0].id, incoming.id);
        assert_eq!(hub.subscription_count(), 1);

        let later = service
            .propose(MatchProposal::new(PlayerId::new(), me, at(20), at(21), "Hall").unwrap())
            .await
            .unwrap();
        hub.publish(TABLE, &insert_record(match_row(&later)));
        assert_eq!(board.pump(), 1);
        assert_eq!(board.matches().len(), 2);
    }

    #[tokio::test]
    async fn failed_first_open_leaves_no_registration() {
        let store = Arc::new(MemoryStore::new());
        let hub = RealtimeHub::new();
        let mut board = MatchBoard::new(Arc::clone(&store), hub.clone(), PlayerId::new());

        store.fail_next_fetch();
        assert!(board.open().await.is_err());

        assert!(board.matches().is_empty());
        assert_eq!(hub.subscription_count(), 0);
    }
}
