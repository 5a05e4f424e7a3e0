//! HTTP server mode exposing recording sessions over REST

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::FileConfigReader;
use crate::error::{Error, ErrorKind, Result};
use crate::fixture::JsonFixtureReader;
use crate::loader::load_spec_from_value;
use crate::session::{
    AddDestinationRequest, AddSourceRequest, GetSpecRequest, InitRequest, ProcessRecordsRequest,
    ReadRecordsRequest, RecordingSession, Secret, WriteRecordsRequest,
};
use crate::types::{new_id, SpecVersion};

/// Server configuration
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Replay fixture records from each application's config
    pub fixtures: bool,
}

/// App state shared across handlers
struct AppState {
    config: ServerConfig,
    sessions: RwLock<HashMap<String, Arc<RecordingSession>>>,
}

impl AppState {
    fn new_session(&self) -> RecordingSession {
        if self.config.fixtures {
            RecordingSession::with_fixtures(
                Arc::new(FileConfigReader::new()),
                Arc::new(JsonFixtureReader::new()),
            )
        } else {
            RecordingSession::new()
        }
    }

    async fn session(&self, id: &str) -> Result<Arc<RecordingSession>> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| Error::SessionNotFound { id: id.to_string() })
    }
}

/// Response wrapper
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// Build the router
pub fn router(config: ServerConfig) -> Router {
    let state = AppState {
        config,
        sessions: RwLock::new(HashMap::new()),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/versions", get(versions))
        .route("/validate", post(validate))
        .route("/sessions", post(create_session))
        .route("/sessions/:id", axum::routing::delete(delete_session))
        .route("/sessions/:id/init", post(init))
        .route("/sessions/:id/sources", post(add_source))
        .route("/sessions/:id/destinations", post(add_destination))
        .route("/sessions/:id/records/read", post(read_records))
        .route("/sessions/:id/records/write", post(write_records))
        .route("/sessions/:id/records/process", post(process_records))
        .route("/sessions/:id/secrets", post(register_secret))
        .route("/sessions/:id/functions", get(has_functions))
        .route("/sessions/:id/spec", post(get_spec))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server
pub async fn serve(config: ServerConfig, port: u16) -> Result<()> {
    let app = router(config);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// HTTP status for a failed operation
fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::SessionNotFound { .. } | Error::FileNotFound { .. } => StatusCode::NOT_FOUND,
        Error::SessionNotInitialized | Error::SessionAlreadyInitialized => StatusCode::CONFLICT,
        Error::InvalidRequest { .. } | Error::UnsupportedLanguage { .. } => StatusCode::BAD_REQUEST,
        _ => match error.kind() {
            ErrorKind::Schema | ErrorKind::Version | ErrorKind::Entity | ErrorKind::Topology => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ErrorKind::Session | ErrorKind::Config => StatusCode::BAD_REQUEST,
            ErrorKind::Io => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

fn respond<T: Serialize>(result: Result<T>) -> Response {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::success(data))).into_response(),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                tracing::error!(error = %e, "Request failed");
            } else {
                tracing::debug!(error = %e, status = %status, "Request rejected");
            }
            (status, Json(ApiResponse::<()>::error(e.to_string()))).into_response()
        }
    }
}

/// Run a session call that may touch the filesystem
async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Other(format!("Task failed: {e}")))?
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// List supported spec versions
async fn versions() -> Response {
    let versions: Vec<Value> = SpecVersion::ALL
        .iter()
        .map(|v| json!({"version": v.as_str(), "latest": v.is_latest()}))
        .collect();
    respond(Ok(json!({ "type": "VERSIONS", "versions": versions })))
}

/// Validate a serialized specification and report its topology
async fn validate(Json(document): Json<Value>) -> Response {
    let result = load_spec_from_value(document).and_then(|spec| {
        let dag = spec.build_dag()?;
        Ok(json!({
            "type": "VALID",
            "spec_version": spec.spec_version(),
            "roots": dag.roots(),
            "deployment_order": dag.topological_order()
        }))
    });
    respond(result)
}

/// Open a new recording session
async fn create_session(State(state): State<Arc<AppState>>) -> Response {
    let id = new_id();
    let session = Arc::new(state.new_session());
    state.sessions.write().await.insert(id.clone(), session);
    tracing::info!(session = %id, "Session opened");
    respond(Ok(json!({ "session_id": id })))
}

/// Discard a recording session
async fn delete_session(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let removed = state.sessions.write().await.remove(&id);
    let result = match removed {
        Some(_) => Ok(json!({ "session_id": id })),
        None => Err(Error::SessionNotFound { id }),
    };
    respond(result)
}

async fn init(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<InitRequest>,
) -> Response {
    let result = match state.session(&id).await {
        Ok(session) => blocking(move || session.init(&req)).await,
        Err(e) => Err(e),
    };
    respond(result)
}

async fn add_source(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AddSourceRequest>,
) -> Response {
    let result = state.session(&id).await.and_then(|s| s.add_source(&req));
    respond(result)
}

async fn add_destination(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AddDestinationRequest>,
) -> Response {
    let result = state
        .session(&id)
        .await
        .and_then(|s| s.add_destination(&req));
    respond(result)
}

async fn read_records(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ReadRecordsRequest>,
) -> Response {
    let result = match state.session(&id).await {
        Ok(session) => blocking(move || session.read_records(&req)).await,
        Err(e) => Err(e),
    };
    respond(result)
}

async fn write_records(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<WriteRecordsRequest>,
) -> Response {
    let result = state.session(&id).await.and_then(|s| s.write_records(&req));
    respond(result)
}

async fn process_records(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ProcessRecordsRequest>,
) -> Response {
    let result = state
        .session(&id)
        .await
        .and_then(|s| s.process_records(&req));
    respond(result)
}

async fn register_secret(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<Secret>,
) -> Response {
    let result = state
        .session(&id)
        .await
        .and_then(|s| s.register_secret(&req));
    respond(result)
}

async fn has_functions(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let result = state
        .session(&id)
        .await
        .and_then(|s| s.has_functions())
        .map(|has| json!({ "has_functions": has }));
    respond(result)
}

/// Finish a session; the specification is returned as JSON
///
/// A session that produced its specification is closed. Sessions that never
/// finish must be closed with `DELETE /sessions/:id`.
async fn get_spec(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<GetSpecRequest>,
) -> Response {
    let result = state.session(&id).await.and_then(|s| {
        let bytes = s.get_spec(&req)?;
        Ok(serde_json::from_slice::<Value>(&bytes)?)
    });
    if result.is_ok() {
        state.sessions.write().await.remove(&id);
        tracing::info!(session = %id, "Session closed");
    }
    respond(result)
}
