//! Per-request input and output types for the two pipelines.
//!
//! Nothing here outlives a single request.

use serde::Serialize;

use crate::image::UploadedImage;
use crate::prompt::ExtractedFeatures;

/// Input for the analyze pipeline.
#[derive(Debug, Clone)]
pub struct AnalyzeInput {
    /// The photo to describe
    pub image: UploadedImage,

    /// Target style; the configured default applies when absent or blank
    pub style: Option<String>,

    /// Free-text edit instruction appended to the composed prompt
    pub instruction: Option<String>,
}

/// Output of the analyze pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeOutcome {
    /// Composed image-generation prompt
    pub prompt: String,

    /// Features the vision model extracted
    pub features: ExtractedFeatures,

    /// Style the prompt was composed for
    pub style: String,

    /// Vision model that answered
    pub model: String,

    /// Vision call latency in milliseconds
    pub latency_ms: u64,
}

/// Where the generate pipeline gets its source image.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Bytes uploaded with the request; stored upstream before generation
    Upload(UploadedImage),

    /// An image already reachable by URL
    Url(String),
}

/// Input for the generate pipeline.
#[derive(Debug, Clone)]
pub struct GenerateInput {
    pub source: ImageSource,
    pub prompt: String,
}

/// Output of the generate pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateOutcome {
    /// URL of the first generated image
    pub image_url: String,

    /// Service log lines collected while the job ran
    pub logs: Vec<String>,

    /// URL the source image was read from
    pub source_url: String,
}
