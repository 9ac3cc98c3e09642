//! Test utilities for penny-core
//!
//! This module provides a mock chat completion server that speaks the
//! OpenAI-compatible wire format, for development and integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::{oneshot, Mutex};

#[derive(Default)]
struct Recorded {
    last_request: Option<Value>,
    last_authorization: Option<String>,
    requests: usize,
}

#[derive(Clone)]
struct MockState {
    reply: String,
    fail: bool,
    recorded: Arc<Mutex<Recorded>>,
}

/// Mock completion server for testing and development
pub struct MockCompletionServer {
    addr: SocketAddr,
    recorded: Arc<Mutex<Recorded>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockCompletionServer {
    /// Start a server that answers every completion with `reply`
    pub async fn start(reply: &str) -> Self {
        Self::spawn(reply, false).await
    }

    /// Start a server that answers every completion with HTTP 429
    pub async fn start_failing() -> Self {
        Self::spawn("", true).await
    }

    async fn spawn(reply: &str, fail: bool) -> Self {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let state = MockState {
            reply: reply.to_string(),
            fail,
            recorded: recorded.clone(),
        };

        let app = Router::new()
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_completion))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            recorded,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Body of the most recent completion request
    pub async fn last_request(&self) -> Option<Value> {
        self.recorded.lock().await.last_request.clone()
    }

    /// Authorization header of the most recent completion request
    pub async fn last_authorization(&self) -> Option<String> {
        self.recorded.lock().await.last_authorization.clone()
    }

    /// Number of completion requests received
    pub async fn request_count(&self) -> usize {
        self.recorded.lock().await.requests
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockCompletionServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Model listing endpoint (health check)
async fn handle_models() -> Json<Value> {
    Json(json!({
        "object": "list",
        "data": [{ "id": "gpt-4", "object": "model" }]
    }))
}

/// Chat completions endpoint
async fn handle_completion(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    {
        let mut recorded = state.recorded.lock().await;
        recorded.requests += 1;
        recorded.last_authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        recorded.last_request = Some(body.clone());
    }

    if state.fail {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": { "message": "Rate limit reached" } })),
        );
    }

    let model = body
        .get("model")
        .and_then(|m| m.as_str())
        .unwrap_or("gpt-4")
        .to_string();

    (
        StatusCode::OK,
        Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "model": model,
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": state.reply },
                "finish_reason": "stop"
            }]
        })),
    )
}
