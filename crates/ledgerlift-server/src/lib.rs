//! LedgerLift Web Server
//!
//! Axum-based REST API around the statement ingestion pipeline. The
//! server is thin glue: parsing, normalization, classification and
//! loading all live in `ledgerlift-core`.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use ledgerlift_core::db::Database;

mod handlers;

/// Maximum statement upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Shared application state
pub struct AppState {
    pub db: Database,
    /// Root of the per-session upload directories
    pub data_dir: PathBuf,
}

/// Build the API router
pub fn create_router(db: Database, data_dir: PathBuf) -> Router {
    let state = Arc::new(AppState { db, data_dir });

    let api_routes = Router::new()
        .route("/process", post(handlers::process_statement))
        .route("/load", post(handlers::load_session))
        .route("/sessions", get(handlers::list_sessions))
        .route("/sessions/:id", delete(handlers::delete_session))
        .route("/clear", post(handlers::clear_all))
        .with_state(state);

    Router::new()
        .route("/", get(health))
        .nest("/api", api_routes)
        .layer(axum::extract::DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        // The upload UI is served elsewhere; allow any origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Start the server
pub async fn serve(
    db: Database,
    data_dir: PathBuf,
    host: &str,
    port: u16,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(&data_dir)?;

    let app = create_router(db, data_dir);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

/// GET / - health check
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "Backend running",
    })
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
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
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<ledgerlift_core::Error> for AppError {
    fn from(err: ledgerlift_core::Error) -> Self {
        use ledgerlift_core::Error;
        let status = match &err {
            Error::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match &err {
            Error::UnsupportedFormat(_) => err.to_string(),
            // Terse message to end users, full detail in the log
            Error::Load(_) => "Load failed; see server log for details".to_string(),
            _ => "An internal error occurred".to_string(),
        };
        Self {
            status,
            message,
            internal: Some(err.into()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "An internal error occurred".to_string(),
            internal: Some(err.into()),
        }
    }
}

#[cfg(test)]
mod tests;
