pub mod orchestrator;

pub use orchestrator::{analyze_batch, analyze_one, BatchEntry, BatchSummary, InferenceGate};
