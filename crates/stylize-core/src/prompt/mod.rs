//! Feature extraction prompt and style template substitution.

mod features;
mod template;

pub use features::{ExtractedFeatures, FEATURE_EXTRACTION_PROMPT};
pub use template::compose_prompt;
