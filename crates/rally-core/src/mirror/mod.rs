//! Local mirror of backend rows.
//!
//! A [`Mirror`] holds the client-visible copy of one filtered row set (the
//! matches involving the current player, or the messages of one open match).
//! It is fed from two independent callback sources: the completion of the
//! client's own writes ([`Mirror::apply_local_insert`]) and the backend's
//! push feed ([`Mirror::apply_remote_change`]). The two may report the same
//! logical write in either order; a seen-id set keeps each row in the mirror
//! exactly once.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

/// A row type that can live in a [`Mirror`].
pub trait MirrorRow {
    /// Server-assigned row id, unique within the mirrored table.
    fn row_id(&self) -> i64;

    /// Sort key the visible sequence is ordered by, ascending.
    fn sort_key(&self) -> DateTime<Utc>;
}

/// A change to a mirrored row set, already decoded to the row type.
#[derive(Debug, Clone, PartialEq)]
pub enum Change<T> {
    /// A row was inserted (possibly by this client itself).
    Insert(T),
    /// An existing row was replaced. The sort key of a row never changes
    /// in this domain, so the row keeps its position.
    Update(T),
    /// The row with this id was removed.
    Delete(i64),
}

/// Ordered local copy of a filtered row set, deduplicated by row id.
#[derive(Debug, Default)]
pub struct Mirror<T> {
    rows: Vec<T>,
    seen: HashSet<i64>,
}

impl<T: MirrorRow> Mirror<T> {
    /// Create an empty mirror.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Replace the mirror with a freshly fetched snapshot.
    ///
    /// The snapshot is sorted ascending by sort key (row id as tiebreak) and
    /// the seen-set becomes exactly the ids of the snapshot. Incremental
    /// updates are only meaningful after this baseline has been applied.
    pub fn load_initial(&mut self, mut rows: Vec<T>) {
        rows.sort_by_key(|row| (row.sort_key(), row.row_id()));
        self.seen = rows.iter().map(MirrorRow::row_id).collect();
        self.rows = rows;
    }

    /// Apply a row the local client just wrote itself.
    ///
    /// Called from the write-completion callback so the acting user sees
    /// their own write without waiting for the push feed to echo it. A row
    /// whose id is already present is ignored.
    pub fn apply_local_insert(&mut self, row: T) {
        self.insert_unseen(row);
    }

    /// Apply a change pushed by the backend for this mirror's filter scope.
    pub fn apply_remote_change(&mut self, change: Change<T>) {
        match change {
            Change::Insert(row) => {
                // Already-seen ids are this client's own writes echoing back.
                self.insert_unseen(row);
            }
            Change::Update(row) => {
                let id = row.row_id();
                if let Some(existing) = self.rows.iter_mut().find(|r| r.row_id() == id) {
                    *existing = row;
                }
                // An update for an unknown id is not an insert: the row was
                // never part of this mirror's baseline.
            }
            Change::Delete(id) => {
                self.rows.retain(|row| row.row_id() != id);
                self.seen.remove(&id);
            }
        }
    }

    /// Clear the mirror on subscription teardown.
    pub fn reset(&mut self) {
        self.rows.clear();
        self.seen.clear();
    }

    /// The visible sequence, ascending by sort key.
    #[must_use]
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Number of rows currently mirrored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the mirror holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether a row id has been seen by this mirror.
    #[must_use]
    pub fn contains(&self, id: i64) -> bool {
        self.seen.contains(&id)
    }

    fn insert_unseen(&mut self, row: T) {
        let id = row.row_id();
        if !self.seen.insert(id) {
            return;
        }
        let key = (row.sort_key(), id);
        let position = self
            .rows
            .partition_point(|existing| (existing.sort_key(), existing.row_id()) <= key);
        self.rows.insert(position, row);
    }
}
