//! Axum Handlers for the REST API
//!
//! This module contains the logic for handling HTTP requests for assessment turns.
//! It uses `utoipa` doc comments to generate OpenAPI documentation.

use assessor_core::{AssessmentError, catalog};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{Instrument, error, info_span, warn};
use uuid::Uuid;

use crate::{
    models::{
        ErrorResponse, HealthResponse, MessagePayload, MessageResponse, RecommendationEntry,
        RecommendationQuery,
    },
    state::AppState,
};

pub enum ApiError {
    BadRequest(String),
    BadGateway(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::BadGateway(message) => {
                warn!("Upstream failure: {}", message);
                (StatusCode::BAD_GATEWAY, Json(ErrorResponse { message })).into_response()
            }
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                let message = "An internal server error occurred.".to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}

impl From<AssessmentError> for ApiError {
    fn from(err: AssessmentError) -> Self {
        match err {
            AssessmentError::Validation(_) => Self::BadRequest(err.to_string()),
            AssessmentError::UpstreamCompletion(_) | AssessmentError::UpstreamEmail(_) => {
                Self::BadGateway(err.to_string())
            }
            AssessmentError::Configuration(_) => Self::InternalServerError(err.into()),
        }
    }
}

/// Submit the learner's next answer and receive the evaluator's reply.
///
/// When `end` is true and an `email` is given, a summary of the whole session
/// is generated and emailed after the reply is computed.
#[utoipa::path(
    post,
    path = "/message",
    request_body = MessagePayload,
    responses(
        (status = 200, description = "Reply computed", body = MessageResponse),
        (status = 400, description = "Missing or empty message", body = ErrorResponse),
        (status = 502, description = "Completion or email service failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MessagePayload>,
) -> Result<Json<MessageResponse>, ApiError> {
    let span = info_span!("message", request_id = %Uuid::new_v4());
    let result = state
        .orchestrator
        .handle_turn(payload.into())
        .instrument(span)
        .await?;
    Ok(Json(result.into()))
}

/// List the recommendation catalog, optionally filtered by keyword.
#[utoipa::path(
    get,
    path = "/recommendations",
    responses(
        (status = 200, description = "Matching catalog entries", body = [RecommendationEntry])
    ),
    params(
        ("keyword" = Option<String>, Query, description = "Case-insensitive keyword or title fragment")
    )
)]
pub async fn list_recommendations(
    Query(query): Query<RecommendationQuery>,
) -> Json<Vec<RecommendationEntry>> {
    let entries = catalog::find_by_keyword(query.keyword.as_deref().unwrap_or(""))
        .into_iter()
        .map(RecommendationEntry::from)
        .collect();
    Json(entries)
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
