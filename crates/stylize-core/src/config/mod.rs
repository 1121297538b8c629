//! Configuration management for Stylize.
//!
//! Configuration is loaded from the platform config directory (or an explicit
//! path) with sensible defaults. All config structs implement `Default`, so a
//! missing file or a partial file both work.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Stylize.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerConfig,

    /// Upload limits and upstream timeouts
    pub limits: LimitsConfig,

    /// Prompt composition settings
    pub prompt: PromptConfig,

    /// Vision-language provider settings
    pub vision: VisionConfig,

    /// Image generation settings
    pub generation: GenerationConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.stylize.stylize/config.toml
    /// - Linux: ~/.config/stylize/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\stylize\config\config.toml
    ///
    /// Falls back to ~/.stylize/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "stylize", "stylize")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".stylize").join("config.toml")
            })
    }

    /// Expand `~` in a user-supplied config path.
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    /// The vision provider settings for Gemini, falling back to defaults.
    pub fn gemini(&self) -> GeminiConfig {
        self.vision.gemini.clone().unwrap_or_default()
    }

    /// The vision provider settings for OpenAI, falling back to defaults.
    pub fn openai(&self) -> OpenAiConfig {
        self.vision.openai.clone().unwrap_or_default()
    }

    /// The vision provider settings for Ollama, falling back to defaults.
    pub fn ollama(&self) -> OllamaConfig {
        self.vision.ollama.clone().unwrap_or_default()
    }
}
