//! Image generation service integration.
//!
//! The user's photo is uploaded to the service's storage first, then a
//! queued image-to-image job turns it plus the composed prompt into a new
//! image.

pub(crate) mod fal;
pub(crate) mod provider;

pub use fal::FalClient;
pub use provider::{GenerationOutput, GenerationRequest, ImageGenerator};
