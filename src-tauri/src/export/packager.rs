//! Renders session records into disk artifacts: a single annotated PNG or
//! a bulk ZIP archive. Neither path mutates the session.

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::OncoscopeError;
use crate::render::render_overlay;
use crate::session::ImageRecord;

use super::naming::{
    entry_name, reserve_unique, single_export_name, ARCHIVE_FOLDER, ARCHIVE_NAME,
};

/// Render one record with its detections and write the PNG atomically
/// under `export_dir`. Returns the written path.
pub fn export_png(
    record: &ImageRecord,
    export_dir: &Path,
    stamp: &str,
) -> Result<PathBuf, OncoscopeError> {
    let png = render_overlay(&record.source, &record.detections)?;
    let path = write_atomic(export_dir, &single_export_name(stamp), &png)
        .map_err(|e| OncoscopeError::Export(e.to_string()))?;
    info!("Exported '{}' to {:?}", record.display_name, path);
    Ok(path)
}

/// Render every record with its own detections into one ZIP archive under
/// `export_dir`. A record whose source bytes no longer decode is skipped
/// with a warning; the archive continues. Returns `None` when there is
/// nothing to write.
pub fn export_archive(
    records: &[ImageRecord],
    export_dir: &Path,
) -> Result<Option<PathBuf>, OncoscopeError> {
    if records.is_empty() {
        return Ok(None);
    }

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut archive = ZipWriter::new(Cursor::new(Vec::new()));
    let mut used = HashSet::new();
    let mut entries = 0usize;

    for record in records {
        let png = match render_overlay(&record.source, &record.detections) {
            Ok(png) => png,
            Err(e) => {
                warn!("Skipping '{}' in archive: {}", record.display_name, e);
                continue;
            }
        };
        let entry = reserve_unique(entry_name(&record.display_name), &mut used);
        archive
            .start_file(format!("{ARCHIVE_FOLDER}/{entry}"), options)
            .map_err(|e| {
                OncoscopeError::Export(format!("could not open archive entry '{entry}': {e}"))
            })?;
        archive.write_all(&png)?;
        entries += 1;
    }

    if entries == 0 {
        warn!("No record could be rendered; archive not written");
        return Ok(None);
    }

    let cursor = archive
        .finish()
        .map_err(|e| OncoscopeError::Export(format!("could not finalize archive: {e}")))?;

    let path = write_atomic(export_dir, ARCHIVE_NAME, &cursor.into_inner())
        .map_err(|e| OncoscopeError::Export(e.to_string()))?;
    info!("Exported {} render(s) to {:?}", entries, path);
    Ok(Some(path))
}

/// Atomic write: temp file in the destination directory, then rename.
/// An interrupted export never leaves a partial artifact behind.
fn write_atomic(dir: &Path, file_name: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.flush()?;

    let path = dir.join(file_name);
    temp.persist(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{AnalysisStatus, ImageRecord};
    use std::fs::File;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::new_rgb8(width, height);
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn record(id: u64, name: &str, bytes: Vec<u8>) -> ImageRecord {
        ImageRecord {
            id,
            display_name: name.to_string(),
            source: Arc::new(bytes),
            detections: Vec::new(),
            status: AnalysisStatus::Done,
            error: None,
            inference_time_ms: None,
            model_used: None,
        }
    }

    fn entry_names(path: &Path) -> Vec<String> {
        let archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    #[test]
    fn test_export_png_writes_decodable_artifact() {
        let dir = TempDir::new().unwrap();
        let rec = record(1, "scan.jpg", sample_png(8, 8));

        let path = export_png(&rec, dir.path(), "20240101_120000").unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "Analysis_20240101_120000.png"
        );
        let written = std::fs::read(&path).unwrap();
        assert!(
            image::load_from_memory(&written).is_ok(),
            "exported file should decode as an image"
        );
    }

    #[test]
    fn test_archive_entries_are_unique_per_record() {
        let dir = TempDir::new().unwrap();
        let records = vec![
            record(1, "scan.jpg", sample_png(8, 8)),
            record(2, "scan.jpg", sample_png(8, 8)),
        ];

        let path = export_archive(&records, dir.path()).unwrap().unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "All_Analysis_Results.zip"
        );
        assert_eq!(
            entry_names(&path),
            vec![
                "Analysis_Results/Result_scan.png".to_string(),
                "Analysis_Results/Result_scan_2.png".to_string(),
            ]
        );
    }

    #[test]
    fn test_archive_with_no_records_writes_nothing() {
        let dir = TempDir::new().unwrap();

        let result = export_archive(&[], dir.path()).unwrap();

        assert!(result.is_none());
        assert!(!dir.path().join(ARCHIVE_NAME).exists());
    }

    #[test]
    fn test_archive_skips_undecodable_record() {
        let dir = TempDir::new().unwrap();
        let records = vec![
            record(1, "broken.jpg", b"not an image".to_vec()),
            record(2, "good.jpg", sample_png(8, 8)),
        ];

        let path = export_archive(&records, dir.path()).unwrap().unwrap();

        assert_eq!(
            entry_names(&path),
            vec!["Analysis_Results/Result_good.png".to_string()]
        );
    }
}
