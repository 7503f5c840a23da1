//! HTTP client for the segmentation backend.
//!
//! One operation matters: multipart `POST /analyze` with the raw image
//! bytes plus the device and model selection. A non-2xx status, a
//! non-"success" envelope, or any transport problem is a failure outcome;
//! it is never collapsed into an empty-but-successful detection list.

use std::time::Duration;

use reqwest::multipart;
use tracing::{error, info};

use crate::error::OncoscopeError;
use crate::session::types::ModelConfig;

use super::types::{AnalysisOutcome, AnalyzeResponse};

/// Where the backend listens unless the preference overrides it.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000";

const ANALYZE_TIMEOUT: Duration = Duration::from_secs(60);
const PING_TIMEOUT: Duration = Duration::from_secs(5);

pub struct InferenceClient {
    client: reqwest::Client,
    base_url: String,
}

impl InferenceClient {
    pub fn new(base_url: &str) -> Result<Self, OncoscopeError> {
        let client = reqwest::Client::builder()
            .user_agent("OncoScope/1.0")
            .timeout(ANALYZE_TIMEOUT)
            .build()
            .map_err(|e| OncoscopeError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run inference on one slide.
    ///
    /// `device` is `"0"` (first GPU) when the accelerator flag is set,
    /// `"cpu"` otherwise, matching what the backend expects.
    pub async fn infer(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        config: &ModelConfig,
    ) -> Result<AnalysisOutcome, OncoscopeError> {
        let device = if config.use_accelerator { "0" } else { "cpu" };
        info!(
            "Requesting inference for '{}' (model: {}, device: {})",
            file_name, config.model, device
        );

        let image = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_for(file_name))
            .map_err(|e| OncoscopeError::Transport(format!("Invalid upload part: {}", e)))?;
        let form = multipart::Form::new()
            .part("image", image)
            .text("device", device.to_string())
            .text("model_type", config.model.clone());

        let url = format!("{}/analyze", self.base_url);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OncoscopeError::Transport(format!(
                        "inference request timed out after {}s",
                        ANALYZE_TIMEOUT.as_secs()
                    ))
                } else {
                    OncoscopeError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OncoscopeError::Transport(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            // Error bodies usually carry the JSON envelope with a message.
            let detail = serde_json::from_str::<AnalyzeResponse>(&body)
                .ok()
                .and_then(|r| r.message)
                .unwrap_or_else(|| truncate(&body, 200));
            error!("Inference service returned {}: {}", status, detail);
            return Err(OncoscopeError::Inference(format!("{}: {}", status, detail)));
        }

        let parsed: AnalyzeResponse = serde_json::from_str(&body)
            .map_err(|e| OncoscopeError::Inference(format!("Invalid response JSON: {}", e)))?;

        if parsed.status != "success" {
            let detail = parsed
                .message
                .unwrap_or_else(|| format!("service returned status '{}'", parsed.status));
            error!("Inference failed for '{}': {}", file_name, detail);
            return Err(OncoscopeError::Inference(detail));
        }

        info!(
            "Inference for '{}' returned {} detection(s) in {} ms",
            file_name,
            parsed.detections.len(),
            parsed.inference_speed
        );

        Ok(AnalysisOutcome {
            detections: parsed.detections.into_iter().map(Into::into).collect(),
            inference_time_ms: parsed.inference_speed,
            model_used: parsed.model_used.unwrap_or_else(|| config.model.clone()),
        })
    }

    /// Cheap reachability probe for the health check. Any HTTP response
    /// counts as reachable; only transport errors fail.
    pub async fn ping(&self) -> Result<(), OncoscopeError> {
        self.client
            .get(&self.base_url)
            .timeout(PING_TIMEOUT)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| OncoscopeError::Transport(e.to_string()))
    }
}

pub(crate) fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

fn truncate(body: &str, limit: usize) -> String {
    if body.len() > limit {
        let mut end = limit;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
