//! Filter and ordering model for row requests.
//!
//! A [`Filter`] does double duty: it renders to the query string of a REST
//! request, and it is evaluated locally against JSON rows by the realtime
//! hub to decide which subscriptions a pushed change belongs to.

use serde_json::Value;

/// One condition of a filter.
#[derive(Debug, Clone, PartialEq)]
enum Condition {
    /// Column equals the value.
    Eq(String, Value),
    /// Column value is a member of the set.
    In(String, Vec<Value>),
    /// Any of the columns equals the value ("participant = current user").
    AnyEq(Vec<String>, Value),
}

/// Conjunction of equality/membership conditions on row columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// A filter matching every row.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Require `column` to equal `value`.
    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::Eq(column.into(), value.into()));
        self
    }

    /// Require `column` to be one of `values`.
    #[must_use]
    pub fn is_in(mut self, column: impl Into<String>, values: Vec<Value>) -> Self {
        self.conditions.push(Condition::In(column.into(), values));
        self
    }

    /// Require at least one of `columns` to equal `value`.
    #[must_use]
    pub fn any_eq(mut self, columns: &[&str], value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::AnyEq(
            columns.iter().map(ToString::to_string).collect(),
            value.into(),
        ));
        self
    }

    /// Render the filter as PostgREST-style query-string parameters.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        self.conditions
            .iter()
            .map(|condition| match condition {
                Condition::Eq(column, value) => {
                    (column.clone(), format!("eq.{}", scalar_text(value)))
                }
                Condition::In(column, values) => {
                    let list = values.iter().map(scalar_text).collect::<Vec<_>>().join(",");
                    (column.clone(), format!("in.({list})"))
                }
                Condition::AnyEq(columns, value) => {
                    let text = scalar_text(value);
                    let alternatives = columns
                        .iter()
                        .map(|column| format!("{column}.eq.{text}"))
                        .collect::<Vec<_>>()
                        .join(",");
                    ("or".to_string(), format!("({alternatives})"))
                }
            })
            .collect()
    }

    /// Evaluate the filter against a JSON row object.
    ///
    /// Rows that are not objects never match.
    #[must_use]
    pub fn matches(&self, row: &Value) -> bool {
        let Some(object) = row.as_object() else {
            return false;
        };
        self.conditions.iter().all(|condition| match condition {
            Condition::Eq(column, value) => object.get(column).is_some_and(|v| loose_eq(v, value)),
            Condition::In(column, values) => object
                .get(column)
                .is_some_and(|v| values.iter().any(|candidate| loose_eq(v, candidate))),
            Condition::AnyEq(columns, value) => columns
                .iter()
                .any(|column| object.get(column).is_some_and(|v| loose_eq(v, value))),
        })
    }
}

/// Sort order of a snapshot fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    column: String,
    ascending: bool,
}

impl Order {
    /// Ascending order on `column`.
    #[must_use]
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    /// Descending order on `column`.
    #[must_use]
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }

    /// Column the order applies to.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Whether the order is ascending.
    #[must_use]
    pub const fn is_ascending(&self) -> bool {
        self.ascending
    }

    /// Render as a PostgREST-style `order` parameter value.
    #[must_use]
    pub fn to_query_value(&self) -> String {
        let direction = if self.ascending { "asc" } else { "desc" };
        format!("{}.{direction}", self.column)
    }
}

/// Text form of a scalar for the query string.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Compare a row value against a filter value, treating a JSON string and a
/// non-string scalar with the same text form as equal. Notification payloads
/// sometimes stringify ids.
fn loose_eq(row_value: &Value, filter_value: &Value) -> bool {
    if row_value == filter_value {
        return true;
    }
    scalar_text(row_value) == scalar_text(filter_value)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn eq_filter_renders_and_matches() {
        let filter = Filter::all().eq("match_id", 7);

        assert_eq!(
            filter.to_query(),
            vec![("match_id".to_string(), "eq.7".to_string())]
        );
        assert!(filter.matches(&json!({"match_id": 7, "body": "hi"})));
        assert!(!filter.matches(&json!({"match_id": 8})));
        assert!(!filter.matches(&json!(42)));
    }

    #[test]
    fn in_filter_renders_and_matches() {
        let filter = Filter::all().is_in("status", vec![json!("pending"), json!("confirmed")]);

        assert_eq!(
            filter.to_query(),
            vec![("status".to_string(), "in.(pending,confirmed)".to_string())]
        );
        assert!(filter.matches(&json!({"status": "pending"})));
        assert!(!filter.matches(&json!({"status": "cancelled"})));
    }

    #[test]
    fn any_eq_filter_matches_either_column() {
        let filter = Filter::all().any_eq(&["proposer_id", "opponent_id"], "abc");

        assert_eq!(
            filter.to_query(),
            vec![(
                "or".to_string(),
                "(proposer_id.eq.abc,opponent_id.eq.abc)".to_string()
            )]
        );
        assert!(filter.matches(&json!({"proposer_id": "abc", "opponent_id": "def"})));
        assert!(filter.matches(&json!({"proposer_id": "def", "opponent_id": "abc"})));
        assert!(!filter.matches(&json!({"proposer_id": "def", "opponent_id": "ghi"})));
    }

    #[test]
    fn conditions_are_a_conjunction() {
        let filter = Filter::all().eq("match_id", 7).eq("sender_id", "abc");

        assert!(filter.matches(&json!({"match_id": 7, "sender_id": "abc"})));
        assert!(!filter.matches(&json!({"match_id": 7, "sender_id": "zzz"})));
    }

    #[test]
    fn stringified_ids_still_match() {
        let filter = Filter::all().eq("match_id", 7);
        assert!(filter.matches(&json!({"match_id": "7"})));
    }

    #[test]
    fn order_renders_direction() {
        assert_eq!(Order::asc("starts_at").to_query_value(), "starts_at.asc");
        assert_eq!(Order::desc("sent_at").to_query_value(), "sent_at.desc");
    }

    #[test]
    fn empty_filter_matches_any_object() {
        assert!(Filter::all().matches(&json!({"anything": 1})));
        assert!(Filter::all().to_query().is_empty());
    }
}
