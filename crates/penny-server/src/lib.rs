//! Penny Web Server
//!
//! Axum-based REST API for the Penny personal finance assistant.
//!
//! Security features:
//! - API key authentication (secure by default, use --no-auth for local dev)
//! - Restrictive CORS policy
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use penny_core::{AIClient, ChatBackend, ChatOrchestrator, Database};

mod conversations;
mod handlers;

pub use conversations::{ConversationInfo, ConversationStore};

/// Authorization header for API key auth
const AUTHORIZATION_HEADER: &str = "authorization";

/// Routes reachable without authentication
const PUBLIC_PATHS: &[&str] = &["/api/health"];

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// API keys accepted as "Bearer <key>" in the Authorization header
    pub api_keys: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            api_keys: vec![],
        }
    }
}

impl ServerConfig {
    /// Read API keys from `PENNY_API_KEYS` (comma-separated)
    pub fn api_keys_from_env() -> Vec<String> {
        std::env::var("PENNY_API_KEYS")
            .map(|s| parse_api_keys(&s))
            .unwrap_or_default()
    }
}

/// Parse a comma-separated list of API keys, skipping blanks
pub fn parse_api_keys(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(|k| k.to_string())
        .collect()
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    /// Chat orchestrator (None when no completion backend is configured)
    pub assistant: Option<ChatOrchestrator>,
    /// Latest conversation per client
    pub conversations: ConversationStore,
}

/// Authentication middleware - validates API keys
///
/// API keys are compared in constant time.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.require_auth || PUBLIC_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let api_key_valid = request
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|key| validate_api_key(key, &state.config.api_keys))
        .unwrap_or(false);

    if api_key_valid {
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "Unauthorized request - no valid auth");
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "Authentication required"
        })),
    )
        .into_response()
}

/// Validate an API key against the configured keys using constant-time comparison
fn validate_api_key(provided: &str, valid_keys: &[String]) -> bool {
    use subtle::ConstantTimeEq;

    let provided_bytes = provided.as_bytes();

    valid_keys.iter().any(|key| {
        let key_bytes = key.as_bytes();
        // Only compare if lengths match (constant-time for same-length keys)
        provided_bytes.len() == key_bytes.len() && bool::from(provided_bytes.ct_eq(key_bytes))
    })
}

/// Create the application router, reading the completion backend from the environment
pub fn create_router(db: Database, config: ServerConfig) -> Router {
    let ai = AIClient::from_env();
    match ai {
        Some(ref client) => info!(
            "Completion backend configured: {} (model: {})",
            client.host(),
            client.model()
        ),
        None => info!("ℹ️  Completion backend not configured (set OPENAI_API_KEY to enable chat)"),
    }
    create_router_with_ai(db, config, ai)
}

/// Create the application router with an explicit completion backend (for testing)
pub fn create_router_with_ai(db: Database, config: ServerConfig, ai: Option<AIClient>) -> Router {
    let assistant = ai.map(|client| ChatOrchestrator::new(db.clone(), client));

    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        assistant,
        conversations: ConversationStore::new(),
    });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        // Clients
        .route("/clients", get(handlers::list_clients))
        .route("/clients/:id/summary", get(handlers::get_client_summary))
        // Assistant
        .route("/assistant/chat", post(handlers::chat))
        .route(
            "/assistant/history/:client_id",
            get(handlers::get_history).delete(handlers::delete_history),
        );

    // Build CORS layer
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
}

/// Start the server
pub async fn serve(db: Database, host: &str, port: u16) -> anyhow::Result<()> {
    serve_with_config(db, host, port, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    } else if config.api_keys.is_empty() {
        warn!("⚠️  Authentication required but no API keys configured (set PENNY_API_KEYS)");
    }

    check_ai_connection().await;

    let app = create_router(db, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log completion backend connection status
async fn check_ai_connection() {
    match AIClient::from_env() {
        Some(client) => {
            if client.health_check().await {
                info!(
                    "✅ Completion backend connected: {} (model: {})",
                    client.host(),
                    client.model()
                );
            } else {
                warn!(
                    "⚠️  Completion backend configured but not responding: {} (model: {})",
                    client.host(),
                    client.model()
                );
            }
        }
        None => {
            info!("ℹ️  Completion backend not configured (set OPENAI_API_KEY to enable chat)");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn service_unavailable(msg: &str) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, status = %self.status, "Request failed");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        if let Some(penny_core::Error::NotFound(msg)) = err.downcast_ref::<penny_core::Error>() {
            return Self::not_found(msg);
        }

        // Core errors carry enough to pick a status; everything else is a 500
        let (status, message) = match err.downcast_ref::<penny_core::Error>() {
            Some(core) if core.is_upstream() => (
                StatusCode::BAD_GATEWAY,
                "The assistant is temporarily unavailable".to_string(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                // Return generic message to client
                "An internal error occurred".to_string(),
            ),
        };

        Self {
            status,
            message,
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
