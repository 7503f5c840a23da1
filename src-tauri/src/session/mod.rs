pub mod stats;
pub mod store;
pub mod types;

pub use stats::derive_stats;
pub use store::SessionStore;
pub use types::{
    ActiveView, AnalysisStatus, Detection, ImageRecord, ModelConfig, NewImage, RecordSnapshot,
    SlideStats,
};
