//! Routes for customer profiles.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use beacon_tracking::application::query_handlers::{self, CustomerProfile};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/v1/customers/{id}
#[instrument(skip(state))]
async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<CustomerProfile>, ApiError> {
    let profile = query_handlers::get_customer(
        customer_id,
        &*state.repositories.customers,
        &*state.repositories.events,
    )
    .await?;
    Ok(Json(profile))
}

/// Returns the router for customer profiles.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", get(get_customer))
}
