//! Vision-language model integration.
//!
//! Provides a provider abstraction over Gemini, OpenAI (and compatible hosts)
//! and a local Ollama instance. Every provider takes an inline image plus a
//! text prompt and returns text.

pub(crate) mod gemini;
pub(crate) mod ollama;
pub(crate) mod openai;
pub(crate) mod provider;

pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use provider::{
    resolve_env_var, VisionProvider, VisionProviderFactory, VisionRequest, VisionResponse,
};
