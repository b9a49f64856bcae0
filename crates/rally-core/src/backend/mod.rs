//! Backend row interface: filters, ordering, and the REST client.
//!
//! The managed backend exposes rows over a PostgREST-style interface. This
//! module owns the three request shapes the rest of the crate consumes: a
//! filtered snapshot fetch, a row insert, and a row update. The [`RowStore`]
//! trait is the seam between the services and the transport; [`RestClient`]
//! is the production implementation.

mod client;
mod query;

use async_trait::async_trait;
use serde_json::Value;

pub use client::RestClient;
pub use query::{Filter, Order};

use crate::error::Result;

/// Row fetch/write operations against one backend.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Fetch a snapshot of the rows matching `filter`, sorted by `order`.
    async fn fetch_rows(&self, table: &str, filter: &Filter, order: &Order)
        -> Result<Vec<Value>>;

    /// Insert a row and return it as persisted (server-assigned fields
    /// included).
    async fn insert_row(&self, table: &str, row: Value) -> Result<Value>;

    /// Patch the rows matching `filter` and return the persisted result.
    async fn update_row(&self, table: &str, filter: &Filter, patch: Value) -> Result<Value>;
}
