//! Environment-driven server configuration.

use std::path::PathBuf;
use std::time::Duration;

use ragserve_core::QueryMode;

/// Configuration shared by the two service binaries, read from the
/// environment with sensible defaults for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address, e.g. `0.0.0.0:8001` (`RAGSERVE_BIND`).
    pub bind: String,
    /// Uploads directory (`RAGSERVE_UPLOAD_DIR`, default `uploads`).
    pub uploads_dir: PathBuf,
    /// Embedding backend base URL (`RAGSERVE_EMBEDDING_URL`).
    pub embedding_url: String,
    /// Embedding model name (`RAGSERVE_EMBEDDING_MODEL`).
    pub embedding_model: String,
    /// Generation backend base URL (`RAGSERVE_GENERATION_URL`).
    pub generation_url: String,
    /// Generation model name (`RAGSERVE_GENERATION_MODEL`).
    pub generation_model: String,
    /// Bearer token for the backends (`OPENAI_API_KEY`), if required.
    pub api_key: Option<String>,
    /// Per-request backend timeout (`RAGSERVE_BACKEND_TIMEOUT_SECS`, default 30).
    pub timeout: Duration,
    /// Query mode (`RAGSERVE_QUERY_MODE`: `context` or `generate`).
    pub mode: QueryMode,
    /// Remote text source ingested once at startup (`RAGSERVE_SOURCE_URL`).
    pub source_url: Option<String>,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

impl ServerConfig {
    /// Read the configuration from the environment.
    ///
    /// `default_port` differs per binary (8001 for the RAG service, 8002 for
    /// the chat passthrough).
    pub fn from_env(default_port: u16) -> Self {
        let timeout_secs = std::env::var("RAGSERVE_BACKEND_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30u64);
        let mode = match env_or("RAGSERVE_QUERY_MODE", "context").as_str() {
            "generate" => QueryMode::Generate,
            _ => QueryMode::ContextOnly,
        };

        Self {
            bind: env_or("RAGSERVE_BIND", &format!("0.0.0.0:{default_port}")),
            uploads_dir: PathBuf::from(env_or("RAGSERVE_UPLOAD_DIR", "uploads")),
            embedding_url: env_or("RAGSERVE_EMBEDDING_URL", "https://api.openai.com"),
            embedding_model: env_or("RAGSERVE_EMBEDDING_MODEL", "text-embedding-3-small"),
            generation_url: env_or("RAGSERVE_GENERATION_URL", "http://localhost:8000"),
            generation_model: env_or(
                "RAGSERVE_GENERATION_MODEL",
                "meta-llama/Llama-3.2-1B-Instruct",
            ),
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            timeout: Duration::from_secs(timeout_secs),
            mode,
            source_url: std::env::var("RAGSERVE_SOURCE_URL").ok(),
        }
    }
}
