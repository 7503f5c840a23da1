//! Folder import: scan a directory for slide images and append them to
//! the session as pending records.

use std::path::Path;

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::OncoscopeError;
use crate::session::{NewImage, RecordSnapshot, SessionStore};

/// Extensions accepted as slide images (matched case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp", "tif", "tiff"];

pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Scan `dir` (top level only, no recursion) for image files in name order
/// and append them to the session as pending records. Unreadable files are
/// skipped with a warning.
pub fn import_folder(
    store: &SessionStore,
    dir: &Path,
) -> Result<Vec<RecordSnapshot>, OncoscopeError> {
    if !dir.is_dir() {
        return Err(OncoscopeError::InvalidInput(format!(
            "not a directory: {}",
            dir.display()
        )));
    }

    let mut paths: Vec<_> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file() && is_image_path(e.path()))
        .map(|e| e.into_path())
        .collect();
    paths.sort();

    let mut batch = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Skipping unreadable file {:?}: {}", path, e);
                continue;
            }
        };
        let display_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("slide")
            .to_string();
        batch.push(NewImage {
            display_name,
            bytes,
        });
    }

    info!("Imported {} image(s) from {:?}", batch.len(), dir);
    Ok(store.add_images(batch))
}
