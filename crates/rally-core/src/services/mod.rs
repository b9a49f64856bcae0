//! Workflow services over the row store and the realtime hub.
//!
//! Services are constructed with an explicit `Arc<S: RowStore>` (and, for
//! the live views, a [`crate::realtime::RealtimeHub`]) by the composition
//! root. They own the domain rules; the store stays a dumb row interface.

mod availability;
mod board;
mod chat;
mod matches;
mod profiles;

pub use availability::AvailabilityService;
pub use board::MatchBoard;
pub use chat::ChatThread;
pub use matches::MatchService;
pub use profiles::ProfileService;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;

/// Deserialize fetched rows into a typed collection.
fn rows_to<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>> {
    rows.into_iter()
        .map(|row| Ok(serde_json::from_value(row)?))
        .collect()
}

/// Deserialize one persisted row returned by a write.
fn row_to<T: DeserializeOwned>(row: Value) -> Result<T> {
    Ok(serde_json::from_value(row)?)
}
