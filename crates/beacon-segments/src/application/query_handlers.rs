//! Query handlers for the Segments context.

use beacon_core::audience::AudienceMatch;
use beacon_core::clock::Clock;
use beacon_core::error::DomainError;
use beacon_core::repository::{EventRepository, SegmentRecord, SegmentRepository};
use uuid::Uuid;

use crate::application::evaluator;
use crate::domain::definition::SegmentDefinition;

/// Retrieves a segment by id.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the segment does not exist.
pub async fn get_segment_by_id(
    segment_id: Uuid,
    segments: &dyn SegmentRepository,
) -> Result<SegmentRecord, DomainError> {
    segments
        .find_segment(segment_id)
        .await?
        .ok_or_else(|| DomainError::not_found("segment", segment_id))
}

/// Lists every segment, newest first.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if loading fails.
pub async fn list_segments(
    segments: &dyn SegmentRepository,
) -> Result<Vec<SegmentRecord>, DomainError> {
    segments.list_segments().await
}

/// Evaluates a stored segment.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the segment does not exist and
/// `DomainError::Validation` if its stored definition no longer parses.
pub async fn preview_segment(
    segment_id: Uuid,
    clock: &dyn Clock,
    segments: &dyn SegmentRepository,
    events: &dyn EventRepository,
) -> Result<AudienceMatch, DomainError> {
    let segment = get_segment_by_id(segment_id, segments).await?;
    let definition = SegmentDefinition::parse(&segment.definition)?;
    evaluator::evaluate(&definition, clock, events).await
}

/// Evaluates an unsaved definition.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the definition is invalid.
pub async fn preview_definition(
    raw_definition: &serde_json::Value,
    clock: &dyn Clock,
    events: &dyn EventRepository,
) -> Result<AudienceMatch, DomainError> {
    let definition = SegmentDefinition::parse(raw_definition)?;
    evaluator::evaluate(&definition, clock, events).await
}
