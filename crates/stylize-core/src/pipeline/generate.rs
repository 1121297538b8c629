//! Generate: source image + prompt → storage upload → generation job → image URL.

use super::{preview, with_timeout};
use crate::error::{PipelineError, PipelineResult};
use crate::generation::GenerationRequest;
use crate::types::{GenerateInput, GenerateOutcome, ImageSource};
use crate::Stylizer;

/// Error text for a generate request without an image source or prompt.
pub const MISSING_INPUT: &str = "Image file and Prompt are required";

impl Stylizer {
    /// Render a new image from a source image and a prompt.
    pub async fn generate(&self, input: GenerateInput) -> PipelineResult<GenerateOutcome> {
        let prompt = input.prompt.trim();
        if prompt.is_empty() {
            return Err(PipelineError::MissingInput(MISSING_INPUT.to_string()));
        }

        let source_url = match input.source {
            ImageSource::Upload(image) => {
                let url = with_timeout(
                    "Upload",
                    self.config.limits.upload_timeout_ms,
                    self.generator.upload(&image),
                )
                .await
                .map_err(|e| match e {
                    PipelineError::Timeout { .. } => PipelineError::Upload {
                        message: e.to_string(),
                    },
                    other => other,
                })?;
                tracing::info!("Image uploaded successfully: {url}");
                url
            }
            ImageSource::Url(url) => {
                let url = url.trim().to_string();
                if url.is_empty() {
                    return Err(PipelineError::MissingInput(MISSING_INPUT.to_string()));
                }
                if !(url.starts_with("https://") || url.starts_with("http://")) {
                    return Err(PipelineError::InvalidImage {
                        message: format!("imageUrl must be an http(s) URL, got '{url}'"),
                    });
                }
                url
            }
        };

        let request = GenerationRequest::from_config(
            source_url.clone(),
            prompt.to_string(),
            &self.config.generation.fal,
        );

        tracing::info!(
            "Starting {} generation with prompt: {}",
            self.generator.name(),
            preview(prompt, 100)
        );

        let output = with_timeout(
            "Generation",
            self.config.limits.generate_timeout_ms,
            self.generator.generate(&request),
        )
        .await?;

        let image_url = output
            .image_urls
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::EmptyResult("The result was empty.".to_string()))?;

        tracing::info!("Generated image URL: {image_url}");

        Ok(GenerateOutcome {
            image_url,
            logs: output.logs,
            source_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::error::PipelineError;
    use crate::generation::GenerationOutput;
    use crate::image::{fixtures::JPEG, UploadedImage};
    use crate::pipeline::mocks::{MockGenerator, MockVision};
    use crate::types::{GenerateInput, ImageSource};
    use crate::Stylizer;
    use std::sync::atomic::Ordering;
    use std::time::{Duration, Instant};

    fn upload_input(prompt: &str) -> GenerateInput {
        GenerateInput {
            source: ImageSource::Upload(
                UploadedImage::new(JPEG.to_vec(), None, Some("me.jpg"), 1 << 20).unwrap(),
            ),
            prompt: prompt.to_string(),
        }
    }

    fn stylizer(generator: MockGenerator, config: Config) -> Stylizer {
        Stylizer::new(config, Box::new(MockVision::replying("{}")), Box::new(generator))
    }

    #[tokio::test]
    async fn test_generate_uploads_then_generates() {
        let generator = MockGenerator::producing("https://out.test/cartoon.png");
        let uploads = generator.uploads.clone();
        let last = generator.last_request.clone();

        let mut config = Config::default();
        config.generation.fal.overlay_image_url = Some("https://logo.test/bnb.png".to_string());

        let outcome = stylizer(generator, config)
            .generate(upload_input("  A cartoon  "))
            .await
            .unwrap();

        assert_eq!(outcome.image_url, "https://out.test/cartoon.png");
        assert_eq!(outcome.logs, vec!["queued", "done"]);
        assert_eq!(outcome.source_url, "https://storage.test/source.png");
        assert_eq!(uploads.load(Ordering::SeqCst), 1);

        let request = last.lock().unwrap().clone().unwrap();
        assert_eq!(request.prompt, "A cartoon");
        assert_eq!(
            request.image_urls,
            vec!["https://storage.test/source.png", "https://logo.test/bnb.png"]
        );
    }

    #[tokio::test]
    async fn test_generate_from_url_skips_upload() {
        let generator = MockGenerator::producing("https://out.test/a.png");
        let uploads = generator.uploads.clone();
        let outcome = stylizer(generator, Config::default())
            .generate(GenerateInput {
                source: ImageSource::Url("https://img.test/me.png".to_string()),
                prompt: "A cartoon".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(outcome.source_url, "https://img.test/me.png");
        assert_eq!(uploads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generate_rejects_blank_prompt_before_upload() {
        let generator = MockGenerator::producing("https://out.test/a.png");
        let uploads = generator.uploads.clone();
        let err = stylizer(generator, Config::default())
            .generate(upload_input("   "))
            .await
            .unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "Image file and Prompt are required");
        assert_eq!(uploads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generate_rejects_non_http_url() {
        let err = stylizer(MockGenerator::producing("x"), Config::default())
            .generate(GenerateInput {
                source: ImageSource::Url("file:///etc/passwd".to_string()),
                prompt: "A cartoon".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidImage { .. }));
    }

    #[tokio::test]
    async fn test_generate_empty_result() {
        let mut generator = MockGenerator::producing("unused");
        generator.output = GenerationOutput::default();
        let err = stylizer(generator, Config::default())
            .generate(upload_input("A cartoon"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No image generated. The result was empty.");
    }

    #[tokio::test]
    async fn test_generate_upload_failure() {
        let mut generator = MockGenerator::producing("unused");
        generator.upload_result = Err("storage unavailable".to_string());
        let err = stylizer(generator, Config::default())
            .generate(upload_input("A cartoon"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to upload image: storage unavailable");
    }

    #[tokio::test]
    async fn test_generate_upload_timeout_reported_as_upload_failure() {
        let mut generator = MockGenerator::producing("unused");
        generator.upload_delay = Some(Duration::from_secs(5));
        let mut config = Config::default();
        config.limits.upload_timeout_ms = 30;

        let err = stylizer(generator, config)
            .generate(upload_input("A cartoon"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to upload image: Upload timeout after 30ms"
        );
    }

    #[tokio::test]
    async fn test_generate_times_out_after_window_not_before() {
        let mut generator = MockGenerator::producing("https://out.test/late.png");
        generator.generate_delay = Some(Duration::from_secs(5));
        let mut config = Config::default();
        config.limits.generate_timeout_ms = 80;

        let start = Instant::now();
        let err = stylizer(generator, config)
            .generate(upload_input("A cartoon"))
            .await
            .unwrap_err();
        let elapsed = start.elapsed();

        assert!(matches!(err, PipelineError::Timeout { timeout_ms: 80, .. }));
        assert!(elapsed >= Duration::from_millis(80), "returned early: {elapsed:?}");
        assert!(elapsed < Duration::from_secs(5));
    }
}
