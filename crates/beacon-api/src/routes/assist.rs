//! Routes for the Smart-Assist providers.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use beacon_assist::{DraftContext, EmailCopy};
use beacon_core::error::DomainError;
use beacon_segments::domain::definition::SegmentDefinition;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /api/v1/assist/segment.
#[derive(Debug, Deserialize)]
pub struct SegmentPromptRequest {
    /// Free-text audience description.
    pub prompt: String,
}

/// Response body for POST /api/v1/assist/segment.
#[derive(Debug, Serialize)]
pub struct SegmentSuggestion {
    /// Validated, canonical definition.
    pub definition: serde_json::Value,
}

/// POST /api/v1/assist/segment
#[instrument(skip(state, request))]
async fn suggest_segment(
    State(state): State<AppState>,
    Json(request): Json<SegmentPromptRequest>,
) -> Result<Json<SegmentSuggestion>, ApiError> {
    let prompt = request.prompt.trim();
    if prompt.is_empty() {
        return Err(DomainError::Validation("`prompt` must be a non-empty string".to_owned()).into());
    }

    let raw = state.assist.segments.suggest_definition(prompt).await?;
    let definition = SegmentDefinition::parse(&raw).map_err(DomainError::from)?;

    info!(definition = ?definition, "segment suggested");
    Ok(Json(SegmentSuggestion {
        definition: definition.to_json(),
    }))
}

/// POST /api/v1/assist/draft
#[instrument(skip(state, context))]
async fn suggest_draft(
    State(state): State<AppState>,
    Json(context): Json<DraftContext>,
) -> Result<Json<EmailCopy>, ApiError> {
    if context.email.trim().is_empty() {
        return Err(DomainError::Validation("`email` must be a non-empty string".to_owned()).into());
    }

    let copy = state.assist.drafts.draft_email(&context).await?;
    Ok(Json(copy))
}

/// Returns the router for Smart-Assist.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/segment", post(suggest_segment))
        .route("/draft", post(suggest_draft))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use beacon_test_support::InMemoryStore;
    use serde_json::json;

    use super::router;
    use crate::routes::test_support::{memory_state, send};

    #[tokio::test]
    async fn test_segment_prompt_returns_validated_definition() {
        // Arrange
        let app = router().with_state(memory_state(&Arc::new(InMemoryStore::new())));
        let body = json!({"prompt": "Visited /pricing at least 3 times in the last 7 days"});

        // Act
        let (status, json) = send(app, "POST", "/segment", Some(&body)).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["definition"],
            json!({
                "kind": "event_property_equals",
                "eventType": "page_view",
                "path": "path",
                "value": "/pricing",
                "days": 7
            })
        );
    }

    #[tokio::test]
    async fn test_blank_prompt_returns_400() {
        let app = router().with_state(memory_state(&Arc::new(InMemoryStore::new())));

        let (status, _) = send(app, "POST", "/segment", Some(&json!({"prompt": "  "}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_draft_context_returns_copy() {
        let app = router().with_state(memory_state(&Arc::new(InMemoryStore::new())));
        let body = json!({"email": "jane@example.com", "recentEventType": "add_to_cart", "recommendedSku": "WIDGET-42"});

        let (status, json) = send(app, "POST", "/draft", Some(&body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["subject"], "jane, still thinking about WIDGET-42?");
        assert!(json["body"].as_str().unwrap().contains("add to cart"));
    }
}
