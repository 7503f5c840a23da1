//! Deterministic annotation rendering for slide exports.

pub mod glyph;
pub mod overlay;

pub use overlay::{draw_detections, encode_png, format_label, render_overlay};
