//! Per-recipient facts derived from recent events.

use beacon_core::repository::EventRecord;

/// Window of history consulted when personalizing a draft.
pub const PERSONALIZATION_WINDOW_DAYS: i64 = 30;

/// First non-blank `sku` property among `events`, which must be ordered
/// newest first. The value is trimmed.
#[must_use]
pub fn extract_recommended_sku(events: &[EventRecord]) -> Option<String> {
    events.iter().find_map(|event| {
        event
            .properties
            .get("sku")
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|sku| !sku.is_empty())
            .map(str::to_owned)
    })
}

/// Type of the newest event in a newest-first slice.
#[must_use]
pub fn most_recent_event_type(events: &[EventRecord]) -> Option<String> {
    events.first().map(|event| event.event_type.clone())
}
