//! Wire types for the inference service.
//!
//! The service speaks the field names of its own JSON contract (`name`,
//! `conf`, `segments`, `inference_speed`); everything is renamed into the
//! session vocabulary at this boundary so the rest of the app never sees
//! wire naming.

use serde::Deserialize;

use crate::session::types::Detection;

/// One detection exactly as the service serializes it.
#[derive(Debug, Clone, Deserialize)]
pub struct WireDetection {
    #[serde(rename = "name")]
    pub label: String,
    #[serde(rename = "conf")]
    pub confidence: f64,
    #[serde(default)]
    pub segments: Vec<[f64; 2]>,
}

impl From<WireDetection> for Detection {
    fn from(wire: WireDetection) -> Self {
        Detection {
            label: wire.label,
            confidence: wire.confidence,
            polygon: wire.segments,
        }
    }
}

/// Response envelope of `POST /analyze`. Success carries detections and
/// the measured latency; errors carry a `message`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeResponse {
    pub status: String,
    #[serde(default)]
    pub detections: Vec<WireDetection>,
    #[serde(default)]
    pub inference_speed: f64,
    #[serde(default)]
    pub model_used: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A completed, successful analysis in session vocabulary.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub detections: Vec<Detection>,
    pub inference_time_ms: f64,
    pub model_used: String,
}
