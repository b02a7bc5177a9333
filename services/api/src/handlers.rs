//! Axum Handlers for the REST surface
//!
//! Two small JSON endpoints sit next to the WebSocket core: a health check
//! and an API-key status probe used by the front end before opening a
//! connection. Both carry `utoipa` doc comments for the OpenAPI document.

use axum::{extract::State, response::Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub agent: String,
    pub mode: String,
}

#[derive(Serialize, ToSchema)]
pub struct KeyStatusResponse {
    pub configured: bool,
    /// Redacted key prefix, e.g. "sk-abc12...".
    pub partial: Option<String>,
}

/// Report process health.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        agent: "ProViaDoorsSalesAgent".to_string(),
        mode: "voice-enabled".to_string(),
    })
}

/// Check whether the OpenAI API key is configured.
#[utoipa::path(
    get,
    path = "/api/key-status",
    responses(
        (status = 200, description = "Key configuration status", body = KeyStatusResponse)
    )
)]
pub async fn key_status(State(state): State<Arc<AppState>>) -> Json<KeyStatusResponse> {
    Json(KeyStatusResponse {
        configured: state.config.key_looks_configured(),
        partial: redact_key(&state.config.openai_api_key),
    })
}

fn redact_key(key: &str) -> Option<String> {
    if key.is_empty() {
        None
    } else {
        let prefix: String = key.chars().take(8).collect();
        Some(format!("{prefix}..."))
    }
}
