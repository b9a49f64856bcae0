//! Per-match chat thread.

use std::sync::Arc;

use crate::backend::{Filter, Order, RowStore};
use crate::error::Result;
use crate::mirror::Mirror;
use crate::models::{MatchId, Message, MessageDraft, PlayerId};
use crate::realtime::{decode_change, RealtimeHub, Subscription};
use crate::services::{row_to, rows_to};

const TABLE: &str = "messages";

/// The open chat of one match: a [`Mirror`] of its messages plus the
/// subscription keeping it current.
///
/// One thread per open conversation; switching conversations means closing
/// (or dropping) this thread and opening a new one, which tears the old
/// subscription down before the new one can observe an event.
pub struct ChatThread<S> {
    store: Arc<S>,
    match_id: MatchId,
    sender: PlayerId,
    mirror: Mirror<Message>,
    subscription: Option<Subscription>,
}

impl<S: RowStore> ChatThread<S> {
    /// Open the chat for `match_id`: subscribe to its messages and load the
    /// snapshot baseline, oldest first.
    pub async fn open(
        store: Arc<S>,
        hub: &RealtimeHub,
        sender: PlayerId,
        match_id: MatchId,
    ) -> Result<Self> {
        let filter = Filter::all().eq("match_id", match_id.0);
        let subscription = hub.subscribe(TABLE, filter.clone());

        let rows = store
            .fetch_rows(TABLE, &filter, &Order::asc("sent_at"))
            .await?;
        let mut mirror = Mirror::new();
        mirror.load_initial(rows_to(rows)?);

        tracing::debug!(%match_id, messages = mirror.len(), "opened chat thread");
        Ok(Self {
            store,
            match_id,
            sender,
            mirror,
            subscription: Some(subscription),
        })
    }

    /// Send a message and show it immediately.
    ///
    /// The persisted row (server-assigned id and timestamp) is applied as a
    /// local insert; the push-feed echo of the same row is absorbed by the
    /// seen-set whichever side arrives first.
    pub async fn send(&mut self, body: impl Into<String>) -> Result<Message> {
        let draft = MessageDraft::new(self.match_id, self.sender, body)?;
        let payload = serde_json::to_value(&draft)?;
        let row = self.store.insert_row(TABLE, payload).await?;
        let message: Message = row_to(row)?;
        self.mirror.apply_local_insert(message.clone());
        Ok(message)
    }

    /// Apply every already-delivered pushed change; returns how many were
    /// applied (undecodable records are dropped and not counted).
    pub fn pump(&mut self) -> usize {
        let Some(subscription) = self.subscription.as_mut() else {
            return 0;
        };
        let mut applied = 0;
        while let Some(record) = subscription.try_recv() {
            if let Some(change) = decode_change::<Message>(&record) {
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
            if let Some(change) = decode_change::<Message>(&record) {
                self.mirror.apply_remote_change(change);
                return true;
            }
        }
        false
    }

    /// Tear the subscription down and clear the thread.
    pub fn close(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.mirror.reset();
    }

    /// The match this thread belongs to.
    #[must_use]
    pub const fn match_id(&self) -> MatchId {
        self.match_id
    }

    /// The visible messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        self.mirror.rows()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::realtime::{ChangeRecord, EventType};
    use crate::testing::MemoryStore;

    fn insert_record(row: serde_json::Value) -> ChangeRecord {
        ChangeRecord {
            event_type: EventType::Insert,
            new: Some(row),
            old: None,
        }
    }

    async fn seeded_thread() -> (Arc<MemoryStore>, RealtimeHub, ChatThread<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let hub = RealtimeHub::new();
        let me = PlayerId::new();
        let thread = ChatThread::open(Arc::clone(&store), &hub, me, MatchId(1))
            .await
            .unwrap();
        (store, hub, thread)
    }

    #[tokio::test]
    async fn own_message_appears_once_despite_echo() {
        let (_store, hub, mut thread) = seeded_thread().await;

        let sent = thread.send("see you at seven").await.unwrap();
        assert_eq!(thread.messages().len(), 1);

        hub.publish(
            TABLE,
            &insert_record(serde_json::to_value(&sent).unwrap()),
        );
        thread.pump();

        assert_eq!(thread.messages().len(), 1);
        assert_eq!(thread.messages()[0].body, "see you at seven");
    }

    #[tokio::test]
    async fn echo_arriving_before_write_completion_still_deduplicates() {
        let (store, hub, mut thread) = seeded_thread().await;

        // Simulate the push notification overtaking the write response: the
        // other tab of the same user inserted, we get the echo first.
        let other_thread_message = {
            let mut other =
                ChatThread::open(Arc::clone(&store), &hub, thread.sender, MatchId(1))
                    .await
                    .unwrap();
            other.send("ping").await.unwrap()
        };
        hub.publish(
            TABLE,
            &insert_record(serde_json::to_value(&other_thread_message).unwrap()),
        );
        thread.pump();
        assert_eq!(thread.messages().len(), 1);

        // The same logical row applied again as a local insert is ignored.
        thread.mirror.apply_local_insert(other_thread_message);
        assert_eq!(thread.messages().len(), 1);
    }

    #[tokio::test]
    async fn incoming_messages_interleave_in_sent_order() {
        let (store, hub, mut thread) = seeded_thread().await;

        thread.send("first").await.unwrap();
        thread.send("third").await.unwrap();

        // A message persisted by the other participant lands between ours.
        let opponent = PlayerId::new();
        let row = store
            .insert_row(
                TABLE,
                json!({
                    "match_id": 1,
                    "sender_id": opponent.as_str(),
                    "body": "second",
                    "sent_at": between(thread.messages()),
                }),
            )
            .await
            .unwrap();
        hub.publish(TABLE, &insert_record(row));

        assert_eq!(thread.pump(), 1);
        let bodies: Vec<_> = thread.messages().iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["first", "second", "third"]);
    }

    fn between(messages: &[Message]) -> String {
        let first = messages[0].sent_at;
        let last = messages[messages.len() - 1].sent_at;
        (first + (last - first) / 2).to_rfc3339()
    }

    #[tokio::test]
    async fn messages_of_other_matches_never_arrive() {
        let (store, hub, mut thread) = seeded_thread().await;

        let row = store
            .insert_row(
                TABLE,
                json!({
                    "match_id": 2,
                    "sender_id": PlayerId::new().as_str(),
                    "body": "wrong room",
                }),
            )
            .await
            .unwrap();
        hub.publish(TABLE, &insert_record(row));

        assert_eq!(thread.pump(), 0);
        assert!(thread.messages().is_empty());
    }

    #[tokio::test]
    async fn open_loads_existing_history_in_order() {
        let store = Arc::new(MemoryStore::new());
        let hub = RealtimeHub::new();
        let me = PlayerId::new();

        for (body, minute) in [("late", 30), ("early", 10)] {
            store
                .insert_row(
                    TABLE,
                    json!({
                        "match_id": 1,
                        "sender_id": me.as_str(),
                        "body": body,
                        "sent_at": format!("2025-06-01T18:{minute}:00Z"),
                    }),
                )
                .await
                .unwrap();
        }

        let thread = ChatThread::open(store, &hub, me, MatchId(1)).await.unwrap();
        let bodies: Vec<_> = thread.messages().iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["early", "late"]);
    }

    #[tokio::test]
    async fn blank_message_is_rejected_without_a_request() {
        let (store, _hub, mut thread) = seeded_thread().await;

        assert!(thread.send("   ").await.is_err());
        assert!(thread.messages().is_empty());
        assert_eq!(store.row_count(TABLE), 0);
    }

    #[tokio::test]
    async fn close_resets_and_unsubscribes() {
        let (_store, hub, mut thread) = seeded_thread().await;
        thread.send("hello").await.unwrap();
        assert_eq!(hub.subscription_count(), 1);

        thread.close();

        assert!(thread.messages().is_empty());
        assert_eq!(hub.subscription_count(), 0);

        // Events published after teardown are no-ops for this thread.
        hub.publish(
            TABLE,
            &insert_record(json!({
                "id": 99,
                "match_id": 1,
                "sender_id": PlayerId::new().as_str(),
                "body": "ghost",
                "sent_at": "2025-06-01T19:00:00Z",
            })),
        );
        assert_eq!(thread.pump(), 0);
        assert!(thread.messages().is_empty());
    }

    #[tokio::test]
    async fn switching_threads_replaces_the_subscription() {
        let store = Arc::new(MemoryStore::new());
        let hub = RealtimeHub::new();
        let me = PlayerId::new();

        let thread = ChatThread::open(Arc::clone(&store), &hub, me, MatchId(1))
            .await
            .unwrap();
        assert_eq!(hub.subscription_count(), 1);

        drop(thread);
        let thread = ChatThread::open(Arc::clone(&store), &hub, me, MatchId(2))
            .await
            .unwrap();
        assert_eq!(hub.subscription_count(), 1);
        assert_eq!(thread.match_id(), MatchId(2));
    }

    #[tokio::test]
    async fn failed_open_leaves_the_existing_thread_intact() {
        let (store, hub, mut thread) = seeded_thread().await;
        thread.send("hello").await.unwrap();

        store.fail_next_fetch();
        let result = ChatThread::open(Arc::clone(&store), &hub, thread.sender, MatchId(2)).await;
        assert!(result.is_err());

        // The open thread and its subscription are untouched; the aborted
        // attempt's registration is gone.
        assert_eq!(thread.messages().len(), 1);
        assert_eq!(hub.subscription_count(), 1);

        let row = store
            .insert_row(
                TABLE,
                json!({
                    "match_id": 1,
                    "sender_id": PlayerId::new().as_str(),
                    "body": "still here",
                }),
            )
            .await
            .unwrap();
        hub.publish(TABLE, &insert_record(row));
        assert_eq!(thread.pump(), 1);
        assert_eq!(thread.messages().len(), 2);
    }
}
