//! In-memory [`RowStore`] used by service tests.
//!
//! Emulates the backend's server-assigned fields deterministically: integer
//! ids count up from 1, and missing timestamps are filled from a fixed base
//! time advancing one second per insert, so sort orders in tests are stable.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use serde_json::{Map, Value};

use crate::backend::{Filter, Order, RowStore};
use crate::error::{Error, Result};

pub(crate) struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    counter: Mutex<i64>,
    fail_next_fetch: Mutex<bool>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            counter: Mutex::new(0),
            fail_next_fetch: Mutex::new(false),
        }
    }

    /// Make the next `fetch_rows` call fail, simulating a backend outage.
    pub(crate) fn fail_next_fetch(&self) {
        *self.fail_next_fetch.lock().unwrap() = true;
    }

    pub(crate) fn row_count(&self, table: &str) -> usize {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .map_or(0, Vec::len)
    }

    fn next_serial(&self) -> i64 {
        let mut counter = self.counter.lock().unwrap();
        *counter += 1;
        *counter
    }

    fn fill_server_fields(&self, table: &str, row: &mut Map<String, Value>) {
        let serial = self.next_serial();
        let stamp = (Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap()
            + Duration::seconds(serial - 1))
        .to_rfc3339();

        row.entry("id").or_insert_with(|| Value::from(serial));
        row.entry("created_at")
            .or_insert_with(|| Value::from(stamp.clone()));
        if table == "messages" {
            row.entry("sent_at").or_insert_with(|| Value::from(stamp));
        }
        if table == "matches" {
            row.entry("status").or_insert_with(|| Value::from("pending"));
        }
    }
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn fetch_rows(
        &self,
        table: &str,
        filter: &Filter,
        order: &Order,
    ) -> Result<Vec<Value>> {
        {
            let mut fail = self.fail_next_fetch.lock().unwrap();
            if *fail {
                *fail = false;
                return Err(Error::Api("backend unavailable (503)".to_string()));
            }
        }

        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<Value> = tables
            .get(table)
            .map(|rows| rows.iter().filter(|row| filter.matches(row)).cloned().collect())
            .unwrap_or_default();

        rows.sort_by(|a, b| {
            let a = sort_text(a, order.column());
            let b = sort_text(b, order.column());
            if order.is_ascending() {
                a.cmp(&b)
            } else {
                b.cmp(&a)
            }
        });
        Ok(rows)
    }

    async fn insert_row(&self, table: &str, row: Value) -> Result<Value> {
        let Value::Object(mut object) = row else {
            return Err(Error::Api("insert payload must be an object".to_string()));
        };
        self.fill_server_fields(table, &mut object);
        let row = Value::Object(object);

        let mut tables = self.tables.lock().unwrap();
        tables.entry(table.to_string()).or_default().push(row.clone());
        Ok(row)
    }

    async fn update_row(&self, table: &str, filter: &Filter, patch: Value) -> Result<Value> {
        let Value::Object(patch) = patch else {
            return Err(Error::Api("patch payload must be an object".to_string()));
        };

        let mut tables = self.tables.lock().unwrap();
        let mut updated = None;
        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut().filter(|row| filter.matches(row)) {
                if let Value::Object(object) = row {
                    for (key, value) in &patch {
                        object.insert(key.clone(), value.clone());
                    }
                    updated.get_or_insert_with(|| row.clone());
                }
            }
        }
        updated.ok_or_else(|| Error::NotFound(format!("no rows matched in '{table}'")))
    }
}

/// Comparable text form of a row's sort column. RFC 3339 timestamps compare
/// correctly as text; integer ids are zero-padded.
fn sort_text(row: &Value, column: &str) -> String {
    match row.get(column) {
        Some(Value::Number(number)) => format!("{:020}", number.as_i64().unwrap_or(0)),
        Some(Value::String(text)) => text.clone(),
        _ => String::new(),
    }
}
