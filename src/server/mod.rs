//! HTTP surface.
//!
//! # Routes
//!
//! | method | path | handler |
//! |---|---|---|
//! | `GET` | `/` | liveness banner |
//! | `POST` | `/api/info` | metadata probe |
//! | `POST` | `/api/download` | run one download job |
//! | `GET` | `/downloads/{filename}` | stream a finished artifact |
//!
//! Every error body is `{"error": "..."}`; unknown paths get a JSON 404.

mod error;
mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::job::JobCoordinator;

pub use error::{ApiError, ApiResult};
pub use handlers::{DownloadRequest, DownloadResponse, InfoRequest, StatusResponse};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Coordinator running probes and download jobs.
    pub coordinator: Arc<JobCoordinator>,
}

impl AppState {
    /// Wraps `coordinator` for sharing across handlers.
    #[must_use]
    pub fn new(coordinator: JobCoordinator) -> Self {
        Self {
            coordinator: Arc::new(coordinator),
        }
    }
}

/// Builds the router with CORS and request tracing applied.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::status))
        .route("/api/info", post(handlers::info))
        .route("/api/download", post(handlers::download))
        .route("/downloads/{filename}", get(handlers::serve_artifact))
        .fallback(handlers::fallback)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
