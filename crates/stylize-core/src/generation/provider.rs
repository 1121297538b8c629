//! Image generator trait and request/response types.

use crate::config::FalConfig;
use crate::error::PipelineError;
use crate::image::UploadedImage;
use async_trait::async_trait;
use serde::Serialize;

/// Input for one image-to-image generation job.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    /// Source images; the user's image first, then any overlay
    pub image_urls: Vec<String>,
    pub prompt: String,
    pub negative_prompt: String,
    pub strength: f32,
    pub output_format: String,
    pub remove_background: bool,
    pub background: String,
    pub width: u32,
    pub height: u32,
    pub num_images: u32,
}

impl GenerationRequest {
    /// Build a request using the fixed job parameters from config.
    ///
    /// The configured overlay image, if any, is appended after `source_url`.
    pub fn from_config(source_url: String, prompt: String, config: &FalConfig) -> Self {
        let mut image_urls = vec![source_url];
        if let Some(overlay) = config
            .overlay_image_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
        {
            image_urls.push(overlay.to_string());
        }

        Self {
            image_urls,
            prompt,
            negative_prompt: config.negative_prompt.clone(),
            strength: config.strength,
            output_format: config.output_format.clone(),
            remove_background: config.remove_background,
            background: config.background.clone(),
            width: config.width,
            height: config.height,
            num_images: config.num_images,
        }
    }
}

/// Result of a finished generation job.
#[derive(Debug, Clone, Default)]
pub struct GenerationOutput {
    /// Output image URLs in the order the service returned them
    pub image_urls: Vec<String>,
    /// Progress log lines emitted by the service while the job ran
    pub logs: Vec<String>,
}

/// Trait that image generation backends implement.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Store the image where the generation service can fetch it; returns its URL.
    async fn upload(&self, image: &UploadedImage) -> Result<String, PipelineError>;

    /// Run a generation job to completion.
    async fn generate(&self, request: &GenerationRequest)
        -> Result<GenerationOutput, PipelineError>;
}
