//! Commands for the Tracking context.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Command to record one behavioral event. Fields are raw client input.
#[derive(Debug, Clone)]
pub struct IngestEvent {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Customer email, not yet normalized.
    pub email: String,
    /// Event type, not yet trimmed.
    pub event_type: String,
    /// Property bag; must be an object when present.
    pub properties: Option<serde_json::Value>,
    /// Occurrence time; defaults to now.
    pub occurred_at: Option<DateTime<Utc>>,
    /// Raw `Idempotency-Key` header value.
    pub idempotency_key: Option<String>,
}
