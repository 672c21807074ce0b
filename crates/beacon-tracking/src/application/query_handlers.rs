//! Query handlers for the Tracking context.

use beacon_core::error::DomainError;
use beacon_core::repository::{CustomerRecord, CustomerRepository, EventRecord, EventRepository};
use serde::Serialize;
use uuid::Uuid;

/// Number of events returned with a customer profile.
pub const RECENT_EVENTS_LIMIT: usize = 50;

/// A customer with their latest events, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    /// The customer.
    pub customer: CustomerRecord,
    /// Up to fifty most recent events.
    pub events: Vec<EventRecord>,
}

/// Retrieves a customer and their recent events.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the customer does not exist.
pub async fn get_customer(
    customer_id: Uuid,
    customers: &dyn CustomerRepository,
    events: &dyn EventRepository,
) -> Result<CustomerProfile, DomainError> {
    let customer = customers
        .find_customer(customer_id)
        .await?
        .ok_or_else(|| DomainError::not_found("customer", customer_id))?;
    let events = events
        .list_for_customer(customer_id, RECENT_EVENTS_LIMIT)
        .await?;
    Ok(CustomerProfile { customer, events })
}
