//! The RAG service: grounded queries and file uploads.

use std::path::Path;

use axum::extract::{Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::ApiError;
use crate::state::RagState;

/// Request body for `POST /api/rag_chat`.
#[derive(Debug, Deserialize)]
pub struct RagChatRequest {
    /// The natural-language question.
    pub query: String,
}

/// Response body for `POST /api/rag_chat`.
#[derive(Debug, Serialize)]
pub struct RagChatResponse {
    /// Retrieved context, or the generated answer in generate mode.
    pub context: String,
}

/// Response body for `POST /api/upload`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Confirmation message.
    pub message: String,
}

/// Build the RAG service router.
pub fn router(state: RagState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/rag_chat", post(rag_chat))
        .route("/api/upload", post(upload))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok", "service": "ragserve-rag"}))
}

/// `POST /api/rag_chat` — answer a query from the store's current contents.
async fn rag_chat(
    State(state): State<RagState>,
    Json(request): Json<RagChatRequest>,
) -> Result<Json<RagChatResponse>, ApiError> {
    let context = state.query.run(&request.query).await?;
    Ok(Json(RagChatResponse { context }))
}

/// `POST /api/upload` — persist an uploaded file and ingest it.
///
/// The file lands in the uploads directory under its own (base) name, then
/// runs through the full ingestion pipeline into the shared store. Records
/// already written stay in place if ingestion of a later upload fails.
async fn upload(
    State(state): State<RagState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") && field.file_name().is_none() {
            continue;
        }

        // Basename only, so a crafted filename cannot escape the uploads dir.
        let file_name = field
            .file_name()
            .and_then(|name| Path::new(name).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.txt".to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read upload: {e}")))?;

        tokio::fs::create_dir_all(&state.uploads_dir)
            .await
            .map_err(|e| ApiError::internal(format!("failed to create uploads dir: {e}")))?;
        let path = state.uploads_dir.join(&file_name);
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| ApiError::internal(format!("failed to persist upload: {e}")))?;

        let report = state.ingest.ingest_paths(&[path]).await?;
        info!(file = %file_name, chunks = report.chunks, "upload ingested");
        return Ok(Json(UploadResponse {
            message: format!("file '{file_name}' uploaded and indexed ({} chunks)", report.chunks),
        }));
    }

    Err(ApiError::bad_request("multipart request did not contain a file part"))
}
