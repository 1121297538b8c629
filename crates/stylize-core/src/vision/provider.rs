//! Vision provider trait and request/response types.
//!
//! Defines the interface that all vision-language backends implement, plus
//! the factory that creates the configured provider.

use crate::config::Config;
use crate::error::{ConfigError, PipelineError};
use crate::image::ImageInput;
use async_trait::async_trait;

/// A request to describe an image.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    /// The image to describe
    pub image: ImageInput,
    /// Text prompt for the model
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Ask the backend to constrain output to a JSON object
    pub json_output: bool,
}

impl VisionRequest {
    /// Build a structured feature-extraction request.
    ///
    /// Low temperature and JSON mode keep the answer machine-readable.
    pub fn extract_features(image: ImageInput, prompt: &str) -> Self {
        Self {
            image,
            prompt: prompt.to_string(),
            max_tokens: 512,
            temperature: 0.1,
            json_output: true,
        }
    }
}

/// The response from a vision call.
#[derive(Debug, Clone)]
pub struct VisionResponse {
    /// Generated text
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all vision providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (`Stylizer` holds a `Box<dyn VisionProvider>`).
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider name for logging (e.g., "gemini", "ollama").
    fn name(&self) -> &str;

    /// Configured model identifier.
    fn model(&self) -> &str;

    /// Describe the image in the request.
    async fn describe(&self, request: &VisionRequest) -> Result<VisionResponse, PipelineError>;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Resolve an API key or explain which variable is missing.
pub(crate) fn require_key(value: &str, service: &str) -> Result<String, ConfigError> {
    resolve_env_var(value).ok_or_else(|| {
        let hint = if value.starts_with("${") {
            format!("Set the {} env var.", &value[2..value.len() - 1])
        } else {
            "Set api_key in the config file.".to_string()
        };
        ConfigError::MissingCredential(format!("{service} API key not set. {hint}"))
    })
}

/// Factory that creates the configured vision provider.
pub struct VisionProviderFactory;

impl VisionProviderFactory {
    /// Create the provider named by `vision.provider`.
    pub fn create(config: &Config) -> Result<Box<dyn VisionProvider>, ConfigError> {
        match config.vision.provider.as_str() {
            "gemini" => {
                let cfg = config.gemini();
                let api_key = require_key(&cfg.api_key, "Gemini")?;
                Ok(Box::new(super::gemini::GeminiProvider::new(
                    &cfg.endpoint,
                    &api_key,
                    &cfg.model,
                )))
            }
            "openai" => {
                let cfg = config.openai();
                let api_key = require_key(&cfg.api_key, "OpenAI")?;
                Ok(Box::new(super::openai::OpenAiProvider::new(
                    &cfg.endpoint,
                    &api_key,
                    &cfg.model,
                )))
            }
            "ollama" => {
                let cfg = config.ollama();
                Ok(Box::new(super::ollama::OllamaProvider::new(
                    &cfg.endpoint,
                    &cfg.model,
                )))
            }
            other => Err(ConfigError::ValidationError(format!(
                "Unknown vision provider: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GeminiConfig, OpenAiConfig};

    fn image() -> ImageInput {
        ImageInput {
            data: "AAAA".to_string(),
            media_type: "image/png".to_string(),
        }
    }

    #[test]
    fn test_extract_features_request() {
        let request = VisionRequest::extract_features(image(), "Return JSON");
        assert!(request.json_output);
        assert!((request.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(request.prompt, "Return JSON");
    }

    #[test]
    fn test_resolve_env_var() {
        // Non-env-var strings pass through
        assert_eq!(resolve_env_var("plain-key"), Some("plain-key".to_string()));
        // Empty returns None
        assert_eq!(resolve_env_var(""), None);
        // Unset env var returns None
        assert_eq!(resolve_env_var("${DEFINITELY_NOT_SET_XYZ_123}"), None);
    }

    #[test]
    fn test_require_key_names_the_variable() {
        let err = require_key("${DEFINITELY_NOT_SET_XYZ_456}", "Gemini").unwrap_err();
        assert!(err.to_string().contains("DEFINITELY_NOT_SET_XYZ_456"));
    }

    #[test]
    fn test_factory_builds_configured_provider() {
        let mut config = Config::default();
        config.vision.gemini = Some(GeminiConfig {
            api_key: "literal-key".to_string(),
            ..GeminiConfig::default()
        });
        let provider = VisionProviderFactory::create(&config).unwrap();
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.model(), "gemini-2.5-flash");

        config.vision.provider = "openai".to_string();
        config.vision.openai = Some(OpenAiConfig {
            api_key: "sk-test".to_string(),
            model: "gpt-4o".to_string(),
            ..OpenAiConfig::default()
        });
        let provider = VisionProviderFactory::create(&config).unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.model(), "gpt-4o");
    }

    #[test]
    fn test_factory_ollama_needs_no_key() {
        let mut config = Config::default();
        config.vision.provider = "ollama".to_string();
        let provider = VisionProviderFactory::create(&config).unwrap();
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn test_factory_missing_key() {
        let mut config = Config::default();
        config.vision.gemini = Some(GeminiConfig {
            api_key: "${DEFINITELY_NOT_SET_XYZ_789}".to_string(),
            ..GeminiConfig::default()
        });
        let err = VisionProviderFactory::create(&config).err().unwrap();
        assert!(matches!(err, ConfigError::MissingCredential(_)));
    }
}
