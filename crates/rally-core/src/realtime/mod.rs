//! Realtime change feed plumbing.
//!
//! The backend pushes `{eventType, new, old}` records for rows matching a
//! subscription's filter. The network transport is external; it hands raw
//! records to [`RealtimeHub::publish`], and the hub fans them out to the
//! live [`Subscription`]s whose table and filter match. Decoding to typed
//! [`Change`]s happens at the consumer edge so unusable records can be
//! dropped before they touch a mirror.

use std::sync::{Arc, Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::backend::Filter;
use crate::mirror::{Change, MirrorRow};

/// Kind of a pushed row change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Insert,
    Update,
    Delete,
}

/// Raw pushed change record, as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub event_type: EventType,
    #[serde(default)]
    pub new: Option<Value>,
    #[serde(default)]
    pub old: Option<Value>,
}

impl ChangeRecord {
    /// The row this record is about: the new image for inserts and updates,
    /// the old image for deletes.
    #[must_use]
    pub fn row(&self) -> Option<&Value> {
        match self.event_type {
            EventType::Insert | EventType::Update => self.new.as_ref(),
            EventType::Delete => self.old.as_ref(),
        }
    }
}

/// Decode a raw record into a typed mirror change.
///
/// Records that cannot be decoded safely (no row image, no integer id, or a
/// row that does not parse as `T`) yield `None` and are logged at debug;
/// they cannot be deduplicated or ordered, so dropping them is the only safe
/// treatment.
#[must_use]
pub fn decode_change<T>(record: &ChangeRecord) -> Option<Change<T>>
where
    T: MirrorRow + DeserializeOwned,
{
    let Some(row) = record.row() else {
        tracing::debug!(event = ?record.event_type, "dropping change record without row image");
        return None;
    };
    if row_id_of(row).is_none() {
        tracing::debug!(event = ?record.event_type, "dropping change record without row id");
        return None;
    }

    match record.event_type {
        EventType::Insert | EventType::Update => {
            match serde_json::from_value::<T>(row.clone()) {
                Ok(parsed) => Some(match record.event_type {
                    EventType::Insert => Change::Insert(parsed),
                    _ => Change::Update(parsed),
                }),
                Err(error) => {
                    tracing::debug!(%error, "dropping undecodable change record");
                    None
                }
            }
        }
        // Deletes only need the id of the removed row.
        EventType::Delete => row_id_of(row).map(Change::Delete),
    }
}

/// Extract an integer row id from a JSON row, tolerating stringified ids.
fn row_id_of(row: &Value) -> Option<i64> {
    match row.get("id")? {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.parse().ok(),
        _ => None,
    }
}

struct HubEntry {
    id: u64,
    table: String,
    filter: Filter,
    sender: mpsc::UnboundedSender<ChangeRecord>,
}

#[derive(Default)]
struct HubInner {
    next_id: u64,
    entries: Vec<HubEntry>,
}

/// In-process fan-out point between the transport and the subscriptions.
///
/// Cloning shares the registry; the composition root owns one hub per
/// backend connection and passes it to services alongside the row store.
#[derive(Clone, Default)]
pub struct RealtimeHub {
    inner: Arc<Mutex<HubInner>>,
}

impl RealtimeHub {
    /// Create an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscription for rows of `table` matching `filter`.
    #[must_use]
    pub fn subscribe(&self, table: impl Into<String>, filter: Filter) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.entries.push(HubEntry {
            id,
            table: table.into(),
            filter,
            sender,
        });
        Subscription {
            id,
            hub: Arc::clone(&self.inner),
            receiver,
            active: true,
        }
    }

    /// Deliver a pushed record to every live matching subscription.
    ///
    /// Called by the transport layer. Records are matched against the row
    /// image they carry; records without one match nothing and are dropped
    /// at the consumer edge anyway.
    pub fn publish(&self, table: &str, record: &ChangeRecord) {
        let mut inner = self.lock();
        inner.entries.retain(|entry| {
            if entry.table != table {
                return !entry.sender.is_closed();
            }
            let matches = record.row().is_some_and(|row| entry.filter.matches(row));
            if matches && entry.sender.send(record.clone()).is_err() {
                // Receiver side is gone; deliveries to it are no-ops.
                return false;
            }
            !entry.sender.is_closed()
        });
    }

    /// Number of live subscriptions (test and introspection aid).
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.lock().entries.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A live registration on a [`RealtimeHub`].
///
/// Deregisters on [`Subscription::unsubscribe`] or on drop, so tearing down
/// the old subscription is guaranteed to happen before a successor's first
/// event is observed.
pub struct Subscription {
    id: u64,
    hub: Arc<Mutex<HubInner>>,
    receiver: mpsc::UnboundedReceiver<ChangeRecord>,
    active: bool,
}

impl Subscription {
    /// Await the next pushed record; `None` after teardown.
    pub async fn recv(&mut self) -> Option<ChangeRecord> {
        if !self.active {
            return None;
        }
        self.receiver.recv().await
    }

    /// Take the next already-delivered record without waiting.
    pub fn try_recv(&mut self) -> Option<ChangeRecord> {
        if !self.active {
            return None;
        }
        self.receiver.try_recv().ok()
    }

    /// Deregister from the hub. Pending undelivered records are discarded;
    /// later publishes no longer reach this subscription.
    pub fn unsubscribe(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.receiver.close();
        let mut inner = self.hub.lock().unwrap_or_else(PoisonError::into_inner);
        inner.entries.retain(|entry| entry.id != self.id);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
