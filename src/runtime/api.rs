//! HTTP surface: document upload and health endpoints.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::core::{AnalysisBackend, GatewayError, PoolStats, SharedGateway};

/// Multipart field carrying the uploaded document.
pub const DOCUMENT_FIELD: &str = "document";

/// Message returned when admission sheds a request.
pub const BUSY_MESSAGE: &str = "Server busy - System under high load, try again later";

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
    /// Pool statistics at the time of the request.
    pub stats: PoolStats,
}

/// Transport-level failures of the upload endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The multipart body was malformed or lacked the document field.
    #[error("Invalid file upload: {0}")]
    InvalidUpload(String),
    /// The body exceeded the configured size cap.
    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),
    /// Admission or lifecycle failure from the gateway.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(err.body_text())
        } else {
            Self::InvalidUpload(err.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::InvalidUpload(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            Self::Gateway(GatewayError::Busy { waited }) => {
                let retry_after = waited.as_secs().max(1).to_string();
                let body = Json(json!({ "error": BUSY_MESSAGE }));
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    [(header::RETRY_AFTER, retry_after)],
                    body,
                )
                    .into_response();
            }
            Self::Gateway(GatewayError::Shutdown) => {
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
            Self::Gateway(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Build the gateway router.
///
/// `max_payload_bytes` caps the whole request body of `/upload`.
pub fn router<B: AnalysisBackend>(gateway: SharedGateway<B>, max_payload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            "/upload",
            post(upload::<B>).layer(DefaultBodyLimit::max(max_payload_bytes)),
        )
        .route("/health", get(health::<B>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(gateway)
}

/// `POST /upload`: analyse the `document` field of a multipart form.
async fn upload<B: AnalysisBackend>(
    State(gateway): State<SharedGateway<B>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::InvalidUpload(e.body_text()))?;
    let (filename, content) = read_document(&mut multipart).await?;

    info!(filename = %filename, bytes = content.len(), "Upload received");
    let result = gateway.submit(filename, content).await?;
    Ok(Json(result).into_response())
}

/// Pull the document field out of the form, skipping anything else.
async fn read_document(multipart: &mut Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(DOCUMENT_FIELD) {
            debug!(field = ?field.name(), "Skipping multipart field");
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content = field.bytes().await?;
        return Ok((filename, content.to_vec()));
    }
    Err(ApiError::InvalidUpload(format!(
        "missing `{DOCUMENT_FIELD}` field"
    )))
}

/// `GET /health`: liveness plus pool statistics.
async fn health<B: AnalysisBackend>(State(gateway): State<SharedGateway<B>>) -> Json<Health> {
    Json(Health {
        ok: true,
        stats: gateway.stats(),
    })
}
