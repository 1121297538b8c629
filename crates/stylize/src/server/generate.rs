//! `POST /api/generate`: photo (or photo URL) plus prompt in, image URL out.
//!
//! Accepts either a multipart form (`image` file or `imageUrl`, plus
//! `prompt`) or a JSON body `{ "imageUrl": ..., "prompt": ... }`.

use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use serde::{Deserialize, Serialize};
use stylize_core::pipeline::MISSING_GENERATE_INPUT;
use stylize_core::{GenerateInput, ImageSource};

use super::{read_text, ApiError, AppState, FilePart};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateJson {
    image_url: Option<String>,
    prompt: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub image_url: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<String>,
}

/// Fields collected from either body shape.
#[derive(Default)]
struct GenerateForm {
    file: Option<FilePart>,
    image_url: Option<String>,
    prompt: Option<String>,
}

impl GenerateForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            match field.name() {
                Some("image") => form.file = FilePart::read(field).await?,
                Some("imageUrl") => form.image_url = read_text(field).await?,
                Some("prompt") => form.prompt = read_text(field).await?,
                other => tracing::debug!("Ignoring form field {:?}", other),
            }
        }
        Ok(form)
    }

    fn from_json(body: GenerateJson) -> Self {
        let non_blank = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            file: None,
            image_url: non_blank(body.image_url),
            prompt: non_blank(body.prompt),
        }
    }
}

pub async fn generate(
    State(stylizer): State<AppState>,
    request: Request,
) -> Result<Json<GenerateResponse>, ApiError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let form = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        GenerateForm::from_multipart(multipart).await?
    } else if content_type.starts_with("application/json") {
        let Json(body) = Json::<GenerateJson>::from_request(request, &())
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        GenerateForm::from_json(body)
    } else {
        return Err(ApiError::bad_request(
            "Expected a multipart/form-data or application/json body",
        ));
    };

    let source = match (form.file, form.image_url) {
        (Some(file), _) => Some(ImageSource::Upload(
            file.into_upload(stylizer.config().limits.max_file_size_bytes())?,
        )),
        (None, Some(url)) => Some(ImageSource::Url(url)),
        (None, None) => None,
    };
    let (Some(source), Some(prompt)) = (source, form.prompt) else {
        return Err(ApiError::bad_request(MISSING_GENERATE_INPUT));
    };

    let outcome = stylizer.generate(GenerateInput { source, prompt }).await?;

    Ok(Json(GenerateResponse {
        image_url: outcome.image_url,
        logs: outcome.logs,
    }))
}
