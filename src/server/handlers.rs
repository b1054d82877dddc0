//! Route handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{Uri, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::debug;

use super::AppState;
use super::error::{ApiError, ApiResult};
use crate::extract::{ProbeResult, VIDEO_CONTAINER};
use crate::job::{MediaKind, Quality, ServiceError};

const DEFAULT_QUALITY: &str = "1080p";

/// Body of `POST /api/info`.
#[derive(Debug, Default, Deserialize)]
pub struct InfoRequest {
    /// Media page URL.
    pub url: Option<String>,
}

/// Body of `POST /api/download`.
#[derive(Debug, Default, Deserialize)]
pub struct DownloadRequest {
    /// Media page URL.
    pub url: Option<String>,
    /// `mp3` for audio, anything else (default `mp4`) for video.
    pub format: Option<String>,
    /// `720p`, `1080p` (default), `4k`, or anything else for the lowest tier.
    pub quality: Option<String>,
}

/// Body of a successful `POST /api/download`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadResponse {
    /// Always `success`.
    pub status: String,
    /// Retrieval path of the artifact.
    pub download_url: String,
}

/// Body of `GET /`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    /// Always `online`.
    pub status: String,
    /// Human-readable banner.
    pub message: String,
}

pub(super) async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "online".to_string(),
        message: "Media grabber backend is running".to_string(),
    })
}

pub(super) async fn info(
    State(state): State<AppState>,
    body: Result<Json<InfoRequest>, JsonRejection>,
) -> ApiResult<Json<ProbeResult>> {
    let Json(request) = body?;
    let result = state.coordinator.handle_info(request.url.as_deref()).await?;
    Ok(Json(result))
}

pub(super) async fn download(
    State(state): State<AppState>,
    body: Result<Json<DownloadRequest>, JsonRejection>,
) -> ApiResult<Json<DownloadResponse>> {
    let Json(request) = body?;
    let kind = MediaKind::from_format(request.format.as_deref().unwrap_or(VIDEO_CONTAINER));
    let quality = Quality::parse(request.quality.as_deref().unwrap_or(DEFAULT_QUALITY));

    let outcome = state
        .coordinator
        .handle_download(request.url.as_deref(), kind, quality)
        .await?;

    Ok(Json(DownloadResponse {
        status: "success".to_string(),
        download_url: outcome.download_url,
    }))
}

pub(super) async fn serve_artifact(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    let path = state
        .coordinator
        .store()
        .resolve(&filename)
        .await
        .map_err(ServiceError::from)?;

    let file = File::open(&path)
        .await
        .map_err(|_| ServiceError::not_found(&filename))?;
    let size = file
        .metadata()
        .await
        .map_err(|_| ServiceError::not_found(&filename))?
        .len();
    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    debug!(filename = %filename, size, mime = %mime, "streaming artifact");

    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CONTENT_LENGTH, size)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|err| ApiError(ServiceError::internal(err.to_string())))
}

pub(super) async fn fallback(uri: Uri) -> Response {
    ApiError(ServiceError::not_found(uri.path())).into_response()
}
