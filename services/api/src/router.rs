//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application: the
//! small REST surface, the two WebSocket endpoints, static asset serving,
//! and OpenAPI documentation.

use crate::{
    handlers::{self, HealthResponse, KeyStatusResponse},
    state::AppState,
    ws::{ws_text_handler, ws_voice_handler},
};

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::health, handlers::key_status),
    components(schemas(HealthResponse, KeyStatusResponse)),
    tags(
        (name = "Showroom API", description = "Conversational door-sales assistant")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let static_dir = app_state.config.static_dir.clone();

    // Group all routes that require AppState into their own router.
    let api_router = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/key-status", get(handlers::key_status))
        .route("/ws/text", get(ws_text_handler))
        .route("/ws/voice", get(ws_voice_handler))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
}
