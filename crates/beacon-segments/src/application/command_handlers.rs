//! Command handlers for the Segments context.
//!
//! Definitions are validated before anything is written; the stored form is
//! the canonical (trimmed) serialization of the parsed definition.

use beacon_core::clock::Clock;
use beacon_core::error::DomainError;
use beacon_core::repository::{SegmentRecord, SegmentRepository};
use tracing::info;

use crate::domain::commands::{CreateSegment, UpdateSegment};
use crate::domain::definition::SegmentDefinition;

fn validated_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() || name.contains('\0') {
        return Err(DomainError::Validation(
            "`name` must be a non-empty string".to_owned(),
        ));
    }
    Ok(name.to_owned())
}

/// Handles the `CreateSegment` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank name or an invalid
/// definition, and `DomainError::Infrastructure` if persistence fails.
pub async fn handle_create_segment(
    command: &CreateSegment,
    clock: &dyn Clock,
    segments: &dyn SegmentRepository,
) -> Result<SegmentRecord, DomainError> {
    let name = validated_name(&command.name)?;
    let definition = SegmentDefinition::parse(&command.definition)?;

    let segment = segments
        .create_segment(&name, &definition.to_json(), clock.now())
        .await?;

    info!(
        correlation_id = %command.correlation_id,
        segment_id = %segment.id,
        definition = ?definition,
        "segment created"
    );
    Ok(segment)
}

/// Handles the `UpdateSegment` command. Campaigns created from the segment
/// keep their snapshot.
///
/// # Errors
///
/// Returns `DomainError::Validation` for invalid input,
/// `DomainError::NotFound` when the segment is absent, and
/// `DomainError::Infrastructure` if persistence fails.
pub async fn handle_update_segment(
    command: &UpdateSegment,
    clock: &dyn Clock,
    segments: &dyn SegmentRepository,
) -> Result<SegmentRecord, DomainError> {
    let name = command.name.as_deref().map(validated_name).transpose()?;
    let definition = command
        .definition
        .as_ref()
        .map(|raw| SegmentDefinition::parse(raw).map(|d| d.to_json()))
        .transpose()?;

    let segment = segments
        .update_segment(
            command.segment_id,
            name.as_deref(),
            definition.as_ref(),
            clock.now(),
        )
        .await?
        .ok_or_else(|| DomainError::not_found("segment", command.segment_id))?;

    info!(
        correlation_id = %command.correlation_id,
        segment_id = %segment.id,
        "segment updated"
    );
    Ok(segment)
}
