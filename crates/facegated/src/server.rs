//! HTTP surface: upload page, scan endpoints, gallery listing, health.

use crate::render;
use crate::scan::{ScanError, ScanOutcome, Scanner};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use facegate_core::{check_format, GallerySummary, Panel, ProbeError};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tower_http::trace::TraceLayer;

/// Multipart field carrying the uploaded photo.
pub const UPLOAD_FIELD: &str = "image";

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub scanner: Scanner,
}

impl AppState {
    pub fn new(scanner: Scanner) -> Self {
        Self { scanner }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("bad upload: {0}")]
    BadUpload(String),
    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadUpload(_) => StatusCode::BAD_REQUEST,
            ApiError::Scan(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Build the application router.
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/scan", post(scan_page))
        .route("/api/scan", post(scan_json))
        .route("/api/gallery", get(list_gallery))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /
pub async fn serve_index() -> Html<String> {
    Html(render::index_page())
}

/// POST /scan
///
/// Renders the result page. Scan failures are shown in the panel with a 200;
/// only an unusable multipart body yields 400.
pub async fn scan_page(State(state): State<AppState>, multipart: Multipart) -> Response {
    let upload = match read_upload(multipart).await {
        Ok(bytes) => bytes,
        Err(err) => {
            let page = render::result_page(None, &Panel::error(&err));
            return (StatusCode::BAD_REQUEST, Html(page)).into_response();
        }
    };

    let outcome = state.scanner.scan(&upload).await;
    let mime = upload_mime(&upload);
    Html(render::result_page(Some((&upload, mime)), &outcome.panel)).into_response()
}

/// POST /api/scan
pub async fn scan_json(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ScanOutcome>, ApiError> {
    let upload = read_upload(multipart).await?;
    Ok(Json(state.scanner.scan(&upload).await))
}

/// GET /api/gallery
pub async fn list_gallery(
    State(state): State<AppState>,
) -> Result<Json<Vec<GallerySummary>>, ApiError> {
    let gallery = state.scanner.load_gallery().await?;
    Ok(Json(gallery.entries.iter().map(GallerySummary::from).collect()))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "facegated".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Pull the photo bytes out of the multipart body.
async fn read_upload(mut multipart: Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadUpload(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadUpload(e.to_string()))?;
        return match check_format(&bytes) {
            Ok(()) => Ok(bytes.to_vec()),
            Err(ProbeError::Empty) => Err(ApiError::BadUpload("no file selected".into())),
            Err(err) => Err(ApiError::BadUpload(err.to_string())),
        };
    }
    Err(ApiError::BadUpload(format!("missing `{UPLOAD_FIELD}` field")))
}

fn upload_mime(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .map(|f| f.to_mime_type())
        .unwrap_or("application/octet-stream")
}
