//! Deterministic file and archive-entry names for exported artifacts.

use std::collections::HashSet;
use std::path::Path;

use chrono::Utc;

/// Folder prefix every bulk-archive entry lives under.
pub const ARCHIVE_FOLDER: &str = "Analysis_Results";

/// File name of the bulk archive itself.
pub const ARCHIVE_NAME: &str = "All_Analysis_Results.zip";

/// UTC second-resolution stamp used in single-export file names.
pub fn export_stamp() -> String {
    Utc::now().format("%Y%m%d_%H%M%S").to_string()
}

/// File name for a single-image export.
pub fn single_export_name(stamp: &str) -> String {
    format!("Analysis_{stamp}.png")
}

/// Archive entry name for one record: `Result_<name>` with the extension
/// rewritten to `.png`, since entries always hold PNG renders.
pub fn entry_name(display_name: &str) -> String {
    let stem = Path::new(display_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(display_name);
    format!("Result_{stem}.png")
}

/// Reserve `name` in `used`, appending `_2`, `_3`, ... before the
/// extension until the name is unique.
pub fn reserve_unique(name: String, used: &mut HashSet<String>) -> String {
    if used.insert(name.clone()) {
        return name;
    }
    let (stem, ext) = match name.rfind('.') {
        Some(dot) => (&name[..dot], &name[dot..]),
        None => (name.as_str(), ""),
    };
    let mut n = 2u32;
    loop {
        let candidate = format!("{stem}_{n}{ext}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
