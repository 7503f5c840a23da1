//! Client-side half of the inference service boundary.

pub mod client;
pub mod models;
pub mod types;

pub use client::{InferenceClient, DEFAULT_ENDPOINT};
pub use models::{default_model_id, model_catalog, ModelEntry};
pub use types::{AnalysisOutcome, AnalyzeResponse, WireDetection};
