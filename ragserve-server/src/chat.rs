//! The chat passthrough service.
//!
//! Stateless and independent of the RAG service: each request flattens the
//! message history into a completion-style transcript and forwards it to
//! the generation backend.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use ragserve_core::{ChatMessage, render_transcript};

use crate::error::ApiError;
use crate::state::ChatState;

/// Request body for `POST /api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Ordered message history.
    pub messages: Vec<ChatMessage>,
}

/// Response body for `POST /api/chat`.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// The backend's completion, trimmed of surrounding whitespace.
    pub response: String,
}

/// Build the chat passthrough router.
pub fn router(state: ChatState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok", "service": "ragserve-chat"}))
}

/// `POST /api/chat` — forward a message history as a flat transcript.
async fn chat(
    State(state): State<ChatState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if request.messages.is_empty() {
        return Err(ApiError::bad_request("messages must not be empty"));
    }

    let transcript = render_transcript(&request.messages);
    let completion = state.generator.complete(&transcript, &state.params).await?;
    Ok(Json(ChatResponse { response: completion.trim().to_string() }))
}
