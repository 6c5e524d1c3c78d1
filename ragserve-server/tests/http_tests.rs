//! Route-level tests for both services, driven through `tower::oneshot`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::routing::post;
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tower::ServiceExt;

use ragserve_core::{
    DocumentStore, EmbeddingProvider, GenerationParams, IngestionPipeline, InMemoryStore,
    OpenAiGenerator, PipelineConfig, QueryPipeline, Result as RagResult,
};
use ragserve_server::state::{ChatState, RagState};
use ragserve_server::{chat, rag};

const DIM: usize = 32;

/// Deterministic bag-of-words embedder (see core pipeline tests).
struct WordHashEmbedder;

fn fnv(word: &str) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325u64;
    for byte in word.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[async_trait]
impl EmbeddingProvider for WordHashEmbedder {
    async fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
        let mut v = vec![0.0f32; DIM];
        for word in text.to_lowercase().split(|c: char| !c.is_alphanumeric()) {
            if word.is_empty() {
                continue;
            }
            v[(fnv(word) % DIM as u64) as usize] += 1.0;
        }
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

fn rag_state(uploads_dir: std::path::PathBuf) -> (RagState, Arc<InMemoryStore>) {
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(WordHashEmbedder);
    let store = Arc::new(InMemoryStore::with_dimensions(DIM));
    let config = PipelineConfig::builder().top_k(1).build().unwrap();
    let ingest = Arc::new(
        IngestionPipeline::builder()
            .embedding_provider(embedder.clone())
            .store(store.clone())
            .config(config.clone())
            .build()
            .unwrap(),
    );
    let query = Arc::new(
        QueryPipeline::builder()
            .embedding_provider(embedder)
            .store(store.clone())
            .config(config)
            .build()
            .unwrap(),
    );
    (RagState { ingest, query, uploads_dir }, store)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_request(uri: &str, file_name: &str, content: &str) -> Request<Body> {
    let boundary = "ragserve-test-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: text/plain\r\n\r\n{content}\r\n--{boundary}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap()
}

/// Spawn a stub OpenAI-compatible completion backend; returns its base URL.
async fn spawn_completion_backend(captured: Arc<Mutex<Option<Value>>>) -> String {
    let app = Router::new().route(
        "/v1/completions",
        post(move |Json(body): Json<Value>| {
            let captured = captured.clone();
            async move {
                *captured.lock().await = Some(body);
                Json(json!({"choices": [{"text": "  Hello from the backend  "}]}))
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn upload_then_rag_chat_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let (state, store) = rag_state(dir.path().join("uploads"));
    let app = rag::router(state);

    let response = app
        .clone()
        .oneshot(multipart_request("/api/upload", "sky.txt", "The sky is blue."))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("sky.txt"));

    // One short document, default chunk size: exactly one record.
    assert_eq!(store.count().await, 1);

    let response = app
        .oneshot(json_request("/api/rag_chat", json!({"query": "What color is the sky?"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["context"], "The sky is blue.");
}

#[tokio::test]
async fn upload_persists_the_file_to_the_uploads_dir() {
    let dir = tempfile::tempdir().unwrap();
    let uploads = dir.path().join("uploads");
    let (state, _) = rag_state(uploads.clone());
    let app = rag::router(state);

    let response = app
        .oneshot(multipart_request("/api/upload", "notes.txt", "some notes"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(std::fs::read_to_string(uploads.join("notes.txt")).unwrap(), "some notes");
}

#[tokio::test]
async fn upload_without_file_part_is_a_400() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = rag_state(dir.path().join("uploads"));
    let app = rag::router(state);

    let boundary = "ragserve-test-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nnot a file\r\n--{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!body_json(response).await["detail"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn rag_chat_against_an_empty_store_is_a_500_with_detail() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = rag_state(dir.path().join("uploads"));
    let app = rag::router(state);

    let response = app
        .oneshot(json_request("/api/rag_chat", json!({"query": "anything"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body_json(response).await["detail"].as_str().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn chat_forwards_the_flattened_transcript_and_trims_the_reply() {
    let captured = Arc::new(Mutex::new(None));
    let base_url = spawn_completion_backend(captured.clone()).await;

    let generator = Arc::new(
        OpenAiGenerator::new(&base_url, "meta-llama/Llama-3.2-1B-Instruct").unwrap(),
    );
    let app = chat::router(ChatState { generator, params: GenerationParams::new(100, 0.5) });

    let response = app
        .oneshot(json_request(
            "/api/chat",
            json!({"messages": [{"role": "user", "content": "Hi"}]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["response"], "Hello from the backend");

    let sent = captured.lock().await.clone().unwrap();
    assert_eq!(sent["prompt"], "User: Hi\nAssistant: ");
    assert_eq!(sent["max_tokens"], 100);
    assert_eq!(sent["model"], "meta-llama/Llama-3.2-1B-Instruct");
}

#[tokio::test(flavor = "multi_thread")]
async fn chat_with_unreachable_backend_is_a_500_not_a_hang() {
    // Bind-then-drop guarantees a port nothing is listening on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let generator = Arc::new(OpenAiGenerator::new(format!("http://{addr}"), "m").unwrap());
    let app = chat::router(ChatState { generator, params: GenerationParams::new(100, 0.5) });

    let response = app
        .oneshot(json_request("/api/chat", json!({"messages": [{"role": "user", "content": "Hi"}]})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body_json(response).await["detail"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn chat_with_no_messages_is_a_400() {
    let generator = Arc::new(OpenAiGenerator::new("http://127.0.0.1:1", "m").unwrap());
    let app = chat::router(ChatState { generator, params: GenerationParams::new(100, 0.5) });

    let response =
        app.oneshot(json_request("/api/chat", json!({"messages": []}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
