pub mod naming;
pub mod packager;

pub use packager::{export_archive, export_png};
