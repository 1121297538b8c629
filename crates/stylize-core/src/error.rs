//! Error types for the Stylize analyze/generate pipeline.
//!
//! Errors are organized by stage so the HTTP layer can split them into
//! client mistakes (missing or unusable input) and upstream failures.

use thiserror::Error;

/// Top-level error type for Stylize operations.
#[derive(Error, Debug)]
pub enum StylizeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// A credential referenced by the config is not available
    #[error("Missing credential: {0}")]
    MissingCredential(String),
}

/// Request-level errors, organized by pipeline stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A required request field was absent or blank
    #[error("{0}")]
    MissingInput(String),

    /// Uploaded bytes are not a recognised image
    #[error("Invalid image: {message}")]
    InvalidImage { message: String },

    /// Upload exceeds the configured size limit
    #[error("File too large: {size_kb}KB exceeds the {max_mb}MB limit")]
    FileTooLarge { size_kb: u64, max_mb: u64 },

    /// Vision model call failed
    #[error("{message}")]
    Vision {
        message: String,
        status_code: Option<u16>,
    },

    /// Vision model answered, but not with the requested JSON features
    #[error("Failed to extract image features. The vision model returned malformed JSON.")]
    MalformedFeatures { raw: String },

    /// Storage upload of the source image failed
    #[error("Failed to upload image: {message}")]
    Upload { message: String },

    /// Image generation call failed
    #[error("{message}")]
    Generation {
        message: String,
        status_code: Option<u16>,
    },

    /// Generation finished without producing a usable image
    #[error("No image generated. {0}")]
    EmptyResult(String),

    /// Upstream call did not finish within its window
    #[error("{stage} timeout after {}", format_window(*timeout_ms))]
    Timeout { stage: String, timeout_ms: u64 },
}

impl PipelineError {
    /// Whether the failure was caused by the caller's input rather than an upstream.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipelineError::MissingInput(_)
                | PipelineError::InvalidImage { .. }
                | PipelineError::FileTooLarge { .. }
        )
    }

    /// HTTP status reported by the upstream, if the failure came with one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            PipelineError::Vision { status_code, .. }
            | PipelineError::Generation { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

fn format_window(timeout_ms: u64) -> String {
    if timeout_ms % 1000 == 0 {
        format!("{} seconds", timeout_ms / 1000)
    } else {
        format!("{timeout_ms}ms")
    }
}

/// Convenience type alias for Stylize results.
pub type Result<T> = std::result::Result<T, StylizeError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
