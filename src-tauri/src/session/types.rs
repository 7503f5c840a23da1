use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// One finding returned by the inference service.
///
/// Polygon points are percentage-space: each coordinate is 0-100 relative to
/// the natural width/height of the source image, so the same detection maps
/// onto any resolution of that slide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    /// Confidence in percent, 0-100.
    pub confidence: f64,
    /// Ordered draw path; the first point anchors the label box.
    pub polygon: Vec<[f64; 2]>,
}

/// Analysis lifecycle of a slide within the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Pending,
    Analyzing,
    Done,
    Failed,
}

/// One slide tracked by the session. The encoded source bytes are shared,
/// never mutated; detections are only ever replaced wholesale.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub id: u64,
    pub display_name: String,
    pub source: Arc<Vec<u8>>,
    pub detections: Vec<Detection>,
    pub status: AnalysisStatus,
    /// Failure reason of the most recent analysis attempt, if it failed.
    pub error: Option<String>,
    /// Reported latency of the most recent successful analysis.
    pub inference_time_ms: Option<f64>,
    pub model_used: Option<String>,
}

/// A new slide handed to the session (decoded nowhere yet, bytes as given).
#[derive(Debug, Clone)]
pub struct NewImage {
    pub display_name: String,
    pub bytes: Vec<u8>,
}

/// Gallery-level view of a record.
#[derive(Debug, Clone, Serialize)]
pub struct RecordSnapshot {
    pub id: u64,
    pub display_name: String,
    pub status: AnalysisStatus,
    pub detection_count: usize,
    pub error: Option<String>,
}

/// Everything the main view needs for the active slide.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveView {
    pub id: u64,
    pub display_name: String,
    pub status: AnalysisStatus,
    pub detections: Vec<Detection>,
    pub stats: SlideStats,
    pub inference_time_ms: Option<f64>,
    pub model_used: Option<String>,
    pub error: Option<String>,
}

/// Derived statistics for one record, recomputed from its detections on
/// every read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlideStats {
    pub detection_count: usize,
    pub avg_confidence: f64,
    pub affected_pct: f64,
    pub normal_pct: f64,
}

/// Model identifier plus accelerator flag, echoed to every inference call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model: String,
    pub use_accelerator: bool,
}
