//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// TCP port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Request limits and upstream timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum uploaded image size in megabytes
    pub max_file_size_mb: u64,

    /// Vision model call timeout in milliseconds
    pub analyze_timeout_ms: u64,

    /// Source image storage upload timeout in milliseconds
    pub upload_timeout_ms: u64,

    /// Image generation timeout in milliseconds (queue wait included)
    pub generate_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 10,
            analyze_timeout_ms: 60_000,
            upload_timeout_ms: 30_000,
            generate_timeout_ms: 120_000,
        }
    }
}

impl LimitsConfig {
    /// Upload limit in bytes, saturating for unvalidated values.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

/// Prompt composition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Style used when the analyze request does not name one
    pub default_style: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            default_style: "South Park cartoon style".to_string(),
        }
    }
}

/// Vision-language provider selection and per-provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Active provider: "gemini", "openai" or "ollama"
    pub provider: String,

    /// Google Gemini configuration
    pub gemini: Option<GeminiConfig>,

    /// OpenAI (or OpenAI-compatible) configuration
    pub openai: Option<OpenAiConfig>,

    /// Ollama (local) configuration
    pub ollama: Option<OllamaConfig>,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            gemini: None,
            openai: None,
            ollama: None,
        }
    }
}

/// Gemini configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API base URL
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: "${GEMINI_API_KEY}".to_string(),
            model: "gemini-2.5-flash".to_string(),
        }
    }
}

/// OpenAI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// Chat Completions URL; override for OpenAI-compatible hosts
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: "${OPENAI_API_KEY}".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Ollama configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Ollama API endpoint
    pub endpoint: String,

    /// Model name
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2-vision".to_string(),
        }
    }
}

/// Image generation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// fal.ai queue + storage configuration
    pub fal: FalConfig,
}

/// fal.ai configuration and the fixed generation parameters sent with every job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FalConfig {
    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model identifier, e.g. "fal-ai/nano-banana/edit"
    pub model: String,

    /// Queue API base URL
    pub queue_endpoint: String,

    /// Storage API base URL
    pub storage_endpoint: String,

    /// Delay between queue status polls in milliseconds
    pub poll_interval_ms: u64,

    /// Extra image (e.g. a brand logo) passed after the user's image
    pub overlay_image_url: Option<String>,

    /// Negative prompt sent with every job
    pub negative_prompt: String,

    /// Style transfer strength, 0.0..=1.0
    pub strength: f32,

    /// Output image format ("png", "jpeg")
    pub output_format: String,

    /// Ask the model to strip the background
    pub remove_background: bool,

    /// Background hint when the background is removed
    pub background: String,

    /// Output width in pixels
    pub width: u32,

    /// Output height in pixels
    pub height: u32,

    /// Number of images to request
    pub num_images: u32,
}

impl Default for FalConfig {
    fn default() -> Self {
        Self {
            api_key: "${FAL_KEY}".to_string(),
            model: "fal-ai/nano-banana/edit".to_string(),
            queue_endpoint: "https://queue.fal.run".to_string(),
            storage_endpoint: "https://rest.alpha.fal.ai".to_string(),
            poll_interval_ms: 500,
            overlay_image_url: None,
            negative_prompt: "photorealistic, photo, messy, low resolution, ugly, blurry, 3d, \
                              realistic shading, gradients, shadow, texture, bokeh, \
                              complex background, depth of field"
                .to_string(),
            strength: 0.85,
            output_format: "png".to_string(),
            remove_background: true,
            background: "dark".to_string(),
            width: 1024,
            height: 1024,
            num_images: 1,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
