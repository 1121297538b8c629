//! Stylize Core - analyze-then-generate image stylization library.
//!
//! Stylize turns a photo into a stylized image in two steps: a vision model
//! extracts the subject's key features, those features are substituted into
//! a style template, and an image-to-image model renders the result.
//!
//! # Architecture
//!
//! Both steps are stateless request pipelines around external APIs, each
//! bounded by a timeout:
//!
//! ```text
//! Photo → Vision model → Features (JSON) → Styled prompt
//! Photo + Prompt → Storage upload → Generation queue → Image URL
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use stylize_core::{AnalyzeInput, Config, Stylizer, UploadedImage};
//!
//! #[tokio::main]
//! async fn main() -> stylize_core::Result<()> {
//!     let config = Config::load()?;
//!     let stylizer = Stylizer::from_config(config)?;
//!
//!     let bytes = std::fs::read("./me.jpg")?;
//!     let image = UploadedImage::new(bytes, None, Some("me.jpg"), 10 << 20)?;
//!     let outcome = stylizer
//!         .analyze(AnalyzeInput { image, style: None, instruction: None })
//!         .await?;
//!     println!("Prompt: {}", outcome.prompt);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod generation;
pub mod image;
pub mod pipeline;
pub mod prompt;
pub mod types;
pub mod vision;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, PipelineError, PipelineResult, Result, StylizeError};
pub use generation::{FalClient, GenerationOutput, GenerationRequest, ImageGenerator};
pub use image::{ImageFormat, ImageInput, UploadedImage};
pub use prompt::{compose_prompt, ExtractedFeatures};
pub use types::{AnalyzeInput, AnalyzeOutcome, GenerateInput, GenerateOutcome, ImageSource};
pub use vision::{VisionProvider, VisionProviderFactory, VisionRequest, VisionResponse};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Stylizer - the main entry point for both pipelines.
///
/// Holds only immutable state (config and upstream clients), so one instance
/// is shared by every request.
pub struct Stylizer {
    config: Config,
    vision: Box<dyn VisionProvider>,
    generator: Box<dyn ImageGenerator>,
}

impl Stylizer {
    /// Create a Stylizer from explicit upstream clients.
    pub fn new(
        config: Config,
        vision: Box<dyn VisionProvider>,
        generator: Box<dyn ImageGenerator>,
    ) -> Self {
        tracing::debug!(
            "Initializing Stylizer v{} (vision: {}/{}, generator: {})",
            VERSION,
            vision.name(),
            vision.model(),
            generator.name()
        );
        Self {
            config,
            vision,
            generator,
        }
    }

    /// Create a Stylizer with the providers named in the configuration.
    ///
    /// Fails when a required API key is not available.
    pub fn from_config(config: Config) -> Result<Self> {
        let vision = VisionProviderFactory::create(&config)?;
        let generator = Box::new(FalClient::new(&config.generation.fal)?);
        Ok(Self::new(config, vision, generator))
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Identifier of the vision model in use.
    pub fn vision_model(&self) -> &str {
        self.vision.model()
    }
}
