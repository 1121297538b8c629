//! `POST /api/analyze`: photo in, styled prompt out.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use stylize_core::AnalyzeInput;

use super::{read_text, ApiError, AppState, FilePart};

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub prompt: String,
}

pub async fn analyze(
    State(stylizer): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let mut file = None;
    let mut style = None;
    let mut instruction = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("image") => file = FilePart::read(field).await?,
            Some("style") => style = read_text(field).await?,
            Some("instruction") => instruction = read_text(field).await?,
            other => tracing::debug!("Ignoring form field {:?}", other),
        }
    }

    let file = file.ok_or_else(|| ApiError::bad_request("Image is required"))?;
    let image = file.into_upload(stylizer.config().limits.max_file_size_bytes())?;

    let outcome = stylizer
        .analyze(AnalyzeInput {
            image,
            style,
            instruction,
        })
        .await?;

    Ok(Json(AnalyzeResponse {
        prompt: outcome.prompt,
    }))
}
