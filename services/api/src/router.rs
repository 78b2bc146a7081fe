//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API and OpenAPI documentation.

use crate::{
    handlers,
    models::{
        ErrorResponse, FinalizationReport, HealthResponse, MessagePayload, MessageResponse,
        RecommendationEntry,
    },
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::post_message,
        handlers::list_recommendations,
        handlers::health,
    ),
    components(
        schemas(MessagePayload, MessageResponse, FinalizationReport, RecommendationEntry, HealthResponse, ErrorResponse)
    ),
    tags(
        (name = "Assessment API", description = "Conversational Design skills assessment")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/message", post(handlers::post_message))
        .with_state(app_state);

    // Routes below need no state.
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/recommendations", get(handlers::list_recommendations))
        .route("/health", get(handlers::health))
        .merge(api_router)
}
