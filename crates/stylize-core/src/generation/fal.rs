//! fal.ai client: storage upload and queue-based generation.
//!
//! A job is submitted to the queue, its status is polled (with logs) until it
//! completes, and the result document is fetched from the response URL.

use super::provider::{GenerationOutput, GenerationRequest, ImageGenerator};
use crate::config::FalConfig;
use crate::error::{ConfigError, PipelineError};
use crate::image::UploadedImage;
use crate::vision::provider::require_key;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// fal.ai queue + storage client.
pub struct FalClient {
    api_key: String,
    model: String,
    queue_endpoint: String,
    storage_endpoint: String,
    poll_interval: Duration,
    client: reqwest::Client,
}

impl FalClient {
    pub fn new(config: &FalConfig) -> Result<Self, ConfigError> {
        let api_key = require_key(&config.api_key, "fal")?;
        Ok(Self::with_key(config, &api_key))
    }

    /// Build with an already-resolved key.
    pub fn with_key(config: &FalConfig, api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: config.model.trim_matches('/').to_string(),
            queue_endpoint: config.queue_endpoint.trim_end_matches('/').to_string(),
            storage_endpoint: config.storage_endpoint.trim_end_matches('/').to_string(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            client: reqwest::Client::new(),
        }
    }

    fn auth(&self) -> String {
        format!("Key {}", self.api_key)
    }

    /// Queue paths address the app (owner/name), not the sub-path endpoint.
    fn app_id(&self) -> &str {
        let mut slashes = self.model.match_indices('/').map(|(i, _)| i);
        match (slashes.next(), slashes.next()) {
            (Some(_), Some(second)) => &self.model[..second],
            _ => &self.model,
        }
    }

    async fn submit(&self, request: &GenerationRequest) -> Result<QueueSubmit, PipelineError> {
        let url = format!("{}/{}", self.queue_endpoint, self.model);
        let resp = self
            .client
            .post(&url)
            .header("Authorization", self.auth())
            .json(request)
            .send()
            .await
            .map_err(|e| generation_error(format!("fal submit failed: {e}"), None))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(generation_error(
                format!("fal submit HTTP {status}: {text}"),
                Some(status.as_u16()),
            ));
        }

        resp.json().await.map_err(|e| {
            generation_error(format!("Failed to parse fal submit response: {e}"), None)
        })
    }

    async fn poll_status(&self, status_url: &str) -> Result<QueueStatus, PipelineError> {
        let sep = if status_url.contains('?') { '&' } else { '?' };
        let url = format!("{status_url}{sep}logs=1");
        let resp = self
            .client
            .get(&url)
            .header("Authorization", self.auth())
            .send()
            .await
            .map_err(|e| generation_error(format!("fal status request failed: {e}"), None))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(generation_error(
                format!("fal status HTTP {status}: {text}"),
                Some(status.as_u16()),
            ));
        }

        resp.json()
            .await
            .map_err(|e| generation_error(format!("Failed to parse fal status: {e}"), None))
    }

    async fn fetch_result(&self, response_url: &str) -> Result<FalOutput, PipelineError> {
        let resp = self
            .client
            .get(response_url)
            .header("Authorization", self.auth())
            .send()
            .await
            .map_err(|e| generation_error(format!("fal result request failed: {e}"), None))?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(generation_error(
                format!("fal result HTTP {status}: {text}"),
                Some(status.as_u16()),
            ));
        }

        serde_json::from_str(&text).map_err(|e| {
            generation_error(format!("Failed to parse fal result ({e}): {text}"), None)
        })
    }
}

fn generation_error(message: String, status_code: Option<u16>) -> PipelineError {
    PipelineError::Generation {
        message,
        status_code,
    }
}

// --- Storage types ---

#[derive(Serialize)]
struct InitiateUpload<'a> {
    content_type: &'a str,
    file_name: &'a str,
}

#[derive(Deserialize)]
struct InitiateUploadResponse {
    upload_url: String,
    file_url: String,
}

// --- Queue types ---

#[derive(Deserialize)]
struct QueueSubmit {
    request_id: String,
    status_url: Option<String>,
    response_url: Option<String>,
}

#[derive(Deserialize)]
struct QueueStatus {
    status: String,
    #[serde(default)]
    logs: Option<Vec<QueueLog>>,
    queue_position: Option<u32>,
}

#[derive(Deserialize)]
struct QueueLog {
    message: String,
}

#[derive(Deserialize)]
struct FalOutput {
    #[serde(default)]
    images: Vec<FalImage>,
}

#[derive(Deserialize)]
struct FalImage {
    url: Option<String>,
}

#[async_trait]
impl ImageGenerator for FalClient {
    fn name(&self) -> &str {
        "fal"
    }

    async fn upload(&self, image: &UploadedImage) -> Result<String, PipelineError> {
        let url = format!("{}/storage/upload/initiate", self.storage_endpoint);
        let resp = self
            .client
            .post(&url)
            .header("Authorization", self.auth())
            .json(&InitiateUpload {
                content_type: image.media_type(),
                file_name: image.file_name(),
            })
            .send()
            .await
            .map_err(|e| PipelineError::Upload {
                message: format!("initiate request failed: {e}"),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Upload {
                message: format!("initiate HTTP {status}: {text}"),
            });
        }

        let initiated: InitiateUploadResponse =
            resp.json().await.map_err(|e| PipelineError::Upload {
                message: format!("unexpected initiate response: {e}"),
            })?;

        let put = self
            .client
            .put(&initiated.upload_url)
            .header("Content-Type", image.media_type())
            .body(image.bytes().to_vec())
            .send()
            .await
            .map_err(|e| PipelineError::Upload {
                message: format!("PUT failed: {e}"),
            })?;

        let status = put.status();
        if !status.is_success() {
            let text = put.text().await.unwrap_or_default();
            return Err(PipelineError::Upload {
                message: format!("PUT HTTP {status}: {text}"),
            });
        }

        tracing::debug!(
            "Uploaded {} ({} bytes) to {}",
            image.file_name(),
            image.len(),
            initiated.file_url
        );
        Ok(initiated.file_url)
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutput, PipelineError> {
        let submitted = self.submit(request).await?;
        tracing::info!(
            "Submitted fal job {} for model {}",
            submitted.request_id,
            self.model
        );

        let base = format!(
            "{}/{}/requests/{}",
            self.queue_endpoint,
            self.app_id(),
            submitted.request_id
        );
        let status_url = submitted
            .status_url
            .unwrap_or_else(|| format!("{base}/status"));
        let response_url = submitted.response_url.unwrap_or(base);

        let mut logs = Vec::new();
        loop {
            let status = self.poll_status(&status_url).await?;

            // Every status document repeats the full log so far.
            if let Some(all) = status.logs {
                for log in all.into_iter().skip(logs.len()) {
                    tracing::debug!("fal log: {}", log.message);
                    logs.push(log.message);
                }
            }

            match status.status.as_str() {
                "COMPLETED" => break,
                "IN_QUEUE" | "IN_PROGRESS" => {
                    if let Some(position) = status.queue_position {
                        tracing::debug!(
                            "fal job {} queue position {position}",
                            submitted.request_id
                        );
                    }
                    tokio::time::sleep(self.poll_interval).await;
                }
                other => {
                    return Err(generation_error(
                        format!("fal job {} ended with status {other}", submitted.request_id),
                        None,
                    ));
                }
            }
        }

        let output = self.fetch_result(&response_url).await?;
        // A URL-less image ends the list, so an unusable first image reads as no result.
        Ok(GenerationOutput {
            image_urls: output.images.into_iter().map_while(|i| i.url).collect(),
            logs,
        })
    }
}
