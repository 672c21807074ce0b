//! Command handlers for the Tracking context.

use beacon_core::clock::Clock;
use beacon_core::error::DomainError;
use beacon_core::repository::{CustomerRepository, EventRepository, NewEvent};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::domain::commands::IngestEvent;
use crate::domain::validation::{
    normalize_email, normalize_event_type, normalize_idempotency_key, normalize_properties,
};

/// Result of ingesting one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestOutcome {
    /// `false` when the idempotency key matched an earlier event.
    pub created: bool,
    /// Stored (or previously stored) event.
    pub event_id: Uuid,
    /// Customer the event belongs to.
    pub customer_id: Uuid,
}

/// Handles the `IngestEvent` command.
///
/// The customer is created on first sight of its email. A repeated
/// idempotency key for the same customer writes nothing and returns the
/// earlier event with `created: false`.
///
/// # Errors
///
/// Returns `DomainError::Validation` for malformed input and
/// `DomainError::Infrastructure` if persistence fails.
pub async fn handle_ingest_event(
    command: &IngestEvent,
    clock: &dyn Clock,
    customers: &dyn CustomerRepository,
    events: &dyn EventRepository,
) -> Result<IngestOutcome, DomainError> {
    let email = normalize_email(&command.email)?;
    let event_type = normalize_event_type(&command.event_type)?;
    let properties = normalize_properties(command.properties.clone())?;
    let idempotency_key = normalize_idempotency_key(command.idempotency_key.as_deref())?;

    let now = clock.now();
    let customer = customers.upsert_by_email(&email, now).await?;
    let ingested = events
        .insert_event(NewEvent {
            customer_id: customer.id,
            event_type,
            properties,
            occurred_at: command.occurred_at.unwrap_or(now),
            idempotency_key,
            created_at: now,
        })
        .await?;

    info!(
        correlation_id = %command.correlation_id,
        customer_id = %customer.id,
        event_id = %ingested.event.id,
        event_type = %ingested.event.event_type,
        created = ingested.created,
        "event ingested"
    );

    Ok(IngestOutcome {
        created: ingested.created,
        event_id: ingested.event.id,
        customer_id: customer.id,
    })
}
