//! Routes for the Campaigns bounded context.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::patch, routing::post};
use beacon_campaigns::application::command_handlers::{
    self, GenerationOutcome, SendOutcome,
};
use beacon_campaigns::application::query_handlers;
use beacon_campaigns::domain::commands;
use beacon_core::repository::{CampaignRecord, EmailDraftRecord, SendRecord};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /api/v1/campaigns.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignRequest {
    /// Display name.
    pub name: String,
    /// Segment to snapshot.
    pub segment_id: Uuid,
}

/// Request body for PATCH /api/v1/campaigns/{id}/drafts/{draftId}.
#[derive(Debug, Deserialize)]
pub struct ReviewDraftRequest {
    /// `approved` or `rejected`.
    pub status: String,
}

/// POST /api/v1/campaigns
#[instrument(skip(state, request), fields(segment_id = %request.segment_id))]
async fn create_campaign(
    State(state): State<AppState>,
    Json(request): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<CampaignRecord>), ApiError> {
    let command = commands::CreateCampaign {
        correlation_id: Uuid::new_v4(),
        name: request.name,
        segment_id: request.segment_id,
    };

    let campaign = command_handlers::handle_create_campaign(
        &command,
        state.clock.as_ref(),
        &*state.repositories.segments,
        &*state.repositories.campaigns,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(campaign)))
}

/// GET /api/v1/campaigns
#[instrument(skip(state))]
async fn list_campaigns(
    State(state): State<AppState>,
) -> Result<Json<Vec<CampaignRecord>>, ApiError> {
    let campaigns = query_handlers::list_campaigns(&*state.repositories.campaigns).await?;
    Ok(Json(campaigns))
}

/// GET /api/v1/campaigns/{id}
#[instrument(skip(state))]
async fn get_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
) -> Result<Json<CampaignRecord>, ApiError> {
    let campaign =
        query_handlers::get_campaign_by_id(campaign_id, &*state.repositories.campaigns).await?;
    Ok(Json(campaign))
}

/// POST /api/v1/campaigns/{id}/generate-drafts
#[instrument(skip(state))]
async fn generate_drafts(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
) -> Result<Json<GenerationOutcome>, ApiError> {
    let command = commands::GenerateDrafts {
        correlation_id: Uuid::new_v4(),
        campaign_id,
    };

    info!(correlation_id = %command.correlation_id, "handling generate_drafts command");

    let outcome = command_handlers::handle_generate_drafts(
        &command,
        state.clock.as_ref(),
        &*state.repositories.campaigns,
        &*state.repositories.events,
        &*state.repositories.drafts,
        &*state.assist.drafts,
    )
    .await?;

    Ok(Json(outcome))
}

/// GET /api/v1/campaigns/{id}/drafts
#[instrument(skip(state))]
async fn list_drafts(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
) -> Result<Json<Vec<EmailDraftRecord>>, ApiError> {
    let drafts = query_handlers::list_drafts(
        campaign_id,
        &*state.repositories.campaigns,
        &*state.repositories.drafts,
    )
    .await?;
    Ok(Json(drafts))
}

/// PATCH /api/v1/campaigns/{id}/drafts/{draftId}
#[instrument(skip(state, request))]
async fn review_draft(
    State(state): State<AppState>,
    Path((campaign_id, draft_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<ReviewDraftRequest>,
) -> Result<Json<EmailDraftRecord>, ApiError> {
    let command = commands::ReviewDraft {
        correlation_id: Uuid::new_v4(),
        campaign_id,
        draft_id,
        status: request.status,
    };

    let draft = command_handlers::handle_review_draft(
        &command,
        state.clock.as_ref(),
        &*state.repositories.campaigns,
        &*state.repositories.drafts,
    )
    .await?;

    Ok(Json(draft))
}

/// POST /api/v1/campaigns/{id}/send
#[instrument(skip(state))]
async fn send_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
) -> Result<Json<SendOutcome>, ApiError> {
    let command = commands::SendCampaign {
        correlation_id: Uuid::new_v4(),
        campaign_id,
    };

    info!(correlation_id = %command.correlation_id, "handling send_campaign command");

    let outcome = command_handlers::handle_send_campaign(
        &command,
        state.clock.as_ref(),
        &*state.repositories.campaigns,
        &*state.repositories.drafts,
        &*state.repositories.sends,
    )
    .await?;

    Ok(Json(outcome))
}

/// GET /api/v1/campaigns/{id}/sends
#[instrument(skip(state))]
async fn list_sends(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
) -> Result<Json<Vec<SendRecord>>, ApiError> {
    let sends = query_handlers::list_sends(
        campaign_id,
        &*state.repositories.campaigns,
        &*state.repositories.sends,
    )
    .await?;
    Ok(Json(sends))
}

/// Returns the router for the campaigns context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_campaign).get(list_campaigns))
        .route("/{id}", get(get_campaign))
        .route("/{id}/generate-drafts", post(generate_drafts))
        .route("/{id}/drafts", get(list_drafts))
        .route("/{id}/drafts/{draft_id}", patch(review_draft))
        .route("/{id}/send", post(send_campaign))
        .route("/{id}/sends", get(list_sends))
}
