//! HTTP surface: the browser page, health check, and the two JSON APIs.

mod analyze;
mod error;
mod generate;
mod index;

pub use error::ApiError;

use axum::extract::multipart::Field;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use stylize_core::{Stylizer, UploadedImage};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared per-process state: one stylizer serves every request.
pub type AppState = Arc<Stylizer>;

/// Room for multipart boundaries and text fields on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let body_limit = state
        .config()
        .limits
        .max_file_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    Router::new()
        .route("/", get(index::page))
        .route("/health", get(index::health))
        .route("/api/analyze", post(analyze::analyze))
        .route("/api/generate", post(generate::generate))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A file field read out of a multipart body.
struct FilePart {
    bytes: Vec<u8>,
    content_type: Option<String>,
    file_name: Option<String>,
}

impl FilePart {
    /// Read a file field; `None` when the browser sent an empty part.
    async fn read(field: Field<'_>) -> Result<Option<Self>, ApiError> {
        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self {
            bytes: bytes.to_vec(),
            content_type,
            file_name,
        }))
    }

    /// Validate against the configured size limit.
    fn into_upload(self, max_bytes: u64) -> Result<UploadedImage, ApiError> {
        tracing::debug!(
            "Received {} ({} bytes)",
            self.file_name.as_deref().unwrap_or("unnamed file"),
            self.bytes.len()
        );
        Ok(UploadedImage::new(
            self.bytes,
            self.content_type.as_deref(),
            self.file_name.as_deref(),
            max_bytes,
        )?)
    }
}

/// Text field value, `None` when blank.
async fn read_text(field: Field<'_>) -> Result<Option<String>, ApiError> {
    let text = field.text().await?;
    let text = text.trim();
    Ok((!text.is_empty()).then(|| text.to_string()))
}
