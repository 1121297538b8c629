//! Analyze: photo → vision model features → styled prompt.

use super::{preview, with_timeout};
use crate::error::PipelineResult;
use crate::prompt::{compose_prompt, ExtractedFeatures, FEATURE_EXTRACTION_PROMPT};
use crate::types::{AnalyzeInput, AnalyzeOutcome};
use crate::vision::VisionRequest;
use crate::Stylizer;

impl Stylizer {
    /// Derive an image-generation prompt from a photo.
    pub async fn analyze(&self, input: AnalyzeInput) -> PipelineResult<AnalyzeOutcome> {
        let style = input
            .style
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.config.prompt.default_style)
            .to_string();

        tracing::info!(
            "Analyzing {} ({}, {} bytes) for style '{style}'",
            input.image.file_name(),
            input.image.media_type(),
            input.image.len()
        );

        let request =
            VisionRequest::extract_features(input.image.to_input(), FEATURE_EXTRACTION_PROMPT);
        let response = with_timeout(
            "Analysis",
            self.config.limits.analyze_timeout_ms,
            self.vision.describe(&request),
        )
        .await?;

        tracing::debug!(
            "Vision model {} answered in {}ms: {}",
            response.model,
            response.latency_ms,
            preview(&response.text, 200)
        );

        let features = ExtractedFeatures::parse(&response.text)?;
        let prompt = compose_prompt(&style, &features, input.instruction.as_deref());

        tracing::info!("Composed prompt: {}", preview(&prompt, 100));

        Ok(AnalyzeOutcome {
            prompt,
            features,
            style,
            model: response.model,
            latency_ms: response.latency_ms,
        })
    }
}
