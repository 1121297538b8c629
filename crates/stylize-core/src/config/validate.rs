//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

const VISION_PROVIDERS: &[&str] = &["gemini", "openai", "ollama"];

/// Uploads are held in memory whole; anything above this is a misconfiguration.
const MAX_FILE_SIZE_MB_LIMIT: u64 = 1024;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0
            || self.limits.max_file_size_mb > MAX_FILE_SIZE_MB_LIMIT
        {
            return Err(ConfigError::ValidationError(format!(
                "limits.max_file_size_mb must be between 1 and {MAX_FILE_SIZE_MB_LIMIT}"
            )));
        }
        for (name, value) in [
            ("limits.analyze_timeout_ms", self.limits.analyze_timeout_ms),
            ("limits.upload_timeout_ms", self.limits.upload_timeout_ms),
            ("limits.generate_timeout_ms", self.limits.generate_timeout_ms),
            ("generation.fal.poll_interval_ms", self.generation.fal.poll_interval_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!("{name} must be > 0")));
            }
        }
        if !VISION_PROVIDERS.contains(&self.vision.provider.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "vision.provider must be one of {}, got '{}'",
                VISION_PROVIDERS.join(", "),
                self.vision.provider
            )));
        }
        if self.prompt.default_style.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "prompt.default_style must not be empty".into(),
            ));
        }

        let fal = &self.generation.fal;
        if !(0.0..=1.0).contains(&fal.strength) {
            return Err(ConfigError::ValidationError(
                "generation.fal.strength must be between 0.0 and 1.0".into(),
            ));
        }
        if fal.width == 0 || fal.height == 0 {
            return Err(ConfigError::ValidationError(
                "generation.fal.width and height must be > 0".into(),
            ));
        }
        if fal.num_images == 0 {
            return Err(ConfigError::ValidationError(
                "generation.fal.num_images must be > 0".into(),
            ));
        }
        Ok(())
    }
}
