//! The analyze and generate request pipelines.
//!
//! Each upstream call is raced against a wall-clock timeout. When the timer
//! wins, the in-flight call is dropped; there is no cleanup to do.

mod analyze;
mod generate;

pub use generate::MISSING_INPUT as MISSING_GENERATE_INPUT;

use crate::error::{PipelineError, PipelineResult};
use std::future::Future;
use std::time::Duration;

/// Run `fut`, failing with [`PipelineError::Timeout`] after `timeout_ms`.
pub(crate) async fn with_timeout<T, F>(stage: &str, timeout_ms: u64, fut: F) -> PipelineResult<T>
where
    F: Future<Output = PipelineResult<T>>,
{
    match tokio::time::timeout(Duration::from_millis(timeout_ms), fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("{stage} did not finish within {timeout_ms}ms");
            Err(PipelineError::Timeout {
                stage: stage.to_string(),
                timeout_ms,
            })
        }
    }
}

/// First `max` characters of `text`, for log lines.
pub(crate) fn preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max).collect();
        out.push_str("...");
        out
    }
}

#[cfg(test)]
pub(crate) mod mocks {
    //! Configurable upstream doubles shared by the pipeline tests.

    use crate::error::PipelineError;
    use crate::generation::{GenerationOutput, GenerationRequest, ImageGenerator};
    use crate::image::UploadedImage;
    use crate::vision::{VisionProvider, VisionRequest, VisionResponse};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Vision double that answers with fixed text (or an error) after an optional delay.
    pub struct MockVision {
        pub reply: Result<String, u16>,
        pub delay: Option<Duration>,
        pub calls: Arc<AtomicU32>,
        pub last_request: Arc<Mutex<Option<VisionRequest>>>,
    }

    impl MockVision {
        pub fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                delay: None,
                calls: Arc::new(AtomicU32::new(0)),
                last_request: Arc::new(Mutex::new(None)),
            }
        }

        pub fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                ..Self::replying("")
            }
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    #[async_trait]
    impl VisionProvider for MockVision {
        fn name(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "mock-vision-1"
        }

        async fn describe(
            &self,
            request: &VisionRequest,
        ) -> Result<VisionResponse, PipelineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.reply {
                Ok(text) => Ok(VisionResponse {
                    text: text.clone(),
                    model: "mock-vision-1".to_string(),
                    tokens_used: Some(12),
                    latency_ms: 3,
                }),
                Err(status) => Err(PipelineError::Vision {
                    message: format!("Mock HTTP {status}"),
                    status_code: Some(*status),
                }),
            }
        }
    }

    /// Generator double with independent upload/generate behaviour.
    pub struct MockGenerator {
        pub upload_result: Result<String, String>,
        pub upload_delay: Option<Duration>,
        pub output: GenerationOutput,
        pub generate_delay: Option<Duration>,
        pub uploads: Arc<AtomicU32>,
        pub last_request: Arc<Mutex<Option<GenerationRequest>>>,
    }

    impl MockGenerator {
        pub fn producing(url: &str) -> Self {
            Self {
                upload_result: Ok("https://storage.test/source.png".to_string()),
                upload_delay: None,
                output: GenerationOutput {
                    image_urls: vec![url.to_string()],
                    logs: vec!["queued".to_string(), "done".to_string()],
                },
                generate_delay: None,
                uploads: Arc::new(AtomicU32::new(0)),
                last_request: Arc::new(Mutex::new(None)),
            }
        }
    }

    #[async_trait]
    impl ImageGenerator for MockGenerator {
        fn name(&self) -> &str {
            "mock"
        }

        async fn upload(&self, _image: &UploadedImage) -> Result<String, PipelineError> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.upload_delay {
                tokio::time::sleep(delay).await;
            }
            self.upload_result
                .clone()
                .map_err(|message| PipelineError::Upload { message })
        }

        async fn generate(
            &self,
            request: &GenerationRequest,
        ) -> Result<GenerationOutput, PipelineError> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            if let Some(delay) = self.generate_delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self.output.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_timeout_passes_result_through() {
        let result = with_timeout("Test", 1000, async { Ok::<_, PipelineError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout("Test", 20, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, PipelineError>(())
        })
        .await;
        assert!(matches!(
            result,
            Err(PipelineError::Timeout { timeout_ms: 20, .. })
        ));
    }

    #[test]
    fn test_preview_is_char_safe() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("ééééé", 2), "éé...");
    }
}
