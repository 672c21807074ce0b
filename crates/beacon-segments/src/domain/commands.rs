//! Commands for the Segments context.

use uuid::Uuid;

/// Command to create a named segment.
#[derive(Debug, Clone)]
pub struct CreateSegment {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Display name.
    pub name: String,
    /// Untrusted rule definition.
    pub definition: serde_json::Value,
}

/// Command to rename a segment and/or replace its definition.
#[derive(Debug, Clone)]
pub struct UpdateSegment {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The segment to update.
    pub segment_id: Uuid,
    /// New display name.
    pub name: Option<String>,
    /// New untrusted rule definition.
    pub definition: Option<serde_json::Value>,
}
