//! Storage-level audience queries.
//!
//! A validated segment definition is lowered into an [`AudienceQuery`]: an
//! event type, an absolute cutoff and one of three match patterns. Storage
//! backends only ever see this form.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Maximum number of customers returned alongside an audience count.
pub const AUDIENCE_PREVIEW_LIMIT: usize = 50;

/// How events of the queried type must match for a customer to qualify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudiencePattern {
    /// At least one event.
    AnyEvent,
    /// At least one event whose property at `path` has the text form `value`.
    PropertyEquals {
        /// Property path segments, outermost key first.
        path: Vec<String>,
        /// Expected text value.
        value: String,
    },
    /// At least `n` events.
    MinCount(u32),
}

/// A customer audience query over the event store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudienceQuery {
    /// Event type to filter on.
    pub event_type: String,
    /// Only events with `occurred_at >= since` count.
    pub since: DateTime<Utc>,
    /// Match pattern.
    pub pattern: AudiencePattern,
}

/// Minimal customer identity returned by audience queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerRef {
    /// Customer identifier.
    pub id: Uuid,
    /// Normalized email.
    pub email: String,
}

/// Result of an audience query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudienceMatch {
    /// Number of distinct matching customers. Never capped.
    pub count: i64,
    /// Matching customers ordered by email ascending, capped by the caller's limit.
    pub customers: Vec<CustomerRef>,
}

impl AudienceMatch {
    /// An audience with no members.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            count: 0,
            customers: Vec::new(),
        }
    }
}

/// Splits a dotted property path (`"utm.source"`) into its segments.
///
/// Empty segments are dropped, so `"a..b"` and `"a.b"` address the same
/// property.
#[must_use]
pub fn split_property_path(path: &str) -> Vec<String> {
    path.split('.')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Resolves `path` inside `properties` and returns the text form of the
/// value, following PostgreSQL `#>>` semantics: strings unquoted, other
/// scalars and containers as JSON text, `null` or a missing key as `None`.
#[must_use]
pub fn property_text(properties: &serde_json::Value, path: &[String]) -> Option<String> {
    let mut current = properties;
    for segment in path {
        current = match current {
            serde_json::Value::Object(map) => map.get(segment)?,
            serde_json::Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    match current {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_property_path_drops_empty_segments() {
        assert_eq!(split_property_path("utm..source"), vec!["utm", "source"]);
        assert_eq!(split_property_path("path"), vec!["path"]);
    }

    #[test]
    fn test_property_text_reads_nested_string() {
        let props = json!({"utm": {"source": "newsletter"}});
        let path = split_property_path("utm.source");
        assert_eq!(property_text(&props, &path).as_deref(), Some("newsletter"));
    }

    #[test]
    fn test_property_text_renders_numbers_as_json_text() {
        let props = json!({"qty": 3, "flag": true});
        assert_eq!(
            property_text(&props, &["qty".to_owned()]).as_deref(),
            Some("3")
        );
        assert_eq!(
            property_text(&props, &["flag".to_owned()]).as_deref(),
            Some("true")
        );
    }

    #[test]
    fn test_property_text_treats_null_and_missing_as_none() {
        let props = json!({"sku": null});
        assert_eq!(property_text(&props, &["sku".to_owned()]), None);
        assert_eq!(property_text(&props, &["other".to_owned()]), None);
    }
}
