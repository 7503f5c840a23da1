//! Export commands: annotated PNG for the active slide, ZIP for the lot.

use tauri::Manager;
use tracing::info;

use crate::commands::config::export_dir;
use crate::export::naming::export_stamp;
use crate::export::{export_archive, export_png};
use crate::session::SessionStore;

/// Render the active record with its detections and write it to the
/// export directory. Returns the written path.
#[tauri::command]
pub async fn export_active_image(app: tauri::AppHandle) -> Result<String, String> {
    let store = app.state::<SessionStore>();
    let id = store.active_id().ok_or("No active image to export")?;
    let record = store
        .records()
        .into_iter()
        .find(|r| r.id == id)
        .ok_or_else(|| format!("No image with id {} in the current session", id))?;
    let dir = export_dir(&app);
    let stamp = export_stamp();

    let path = tokio::task::spawn_blocking(move || export_png(&record, &dir, &stamp))
        .await
        .map_err(|e| format!("Task panicked: {}", e))?
        .map_err(String::from)?;

    Ok(path.to_string_lossy().to_string())
}

/// Render every record into one ZIP archive. Returns the archive path,
/// or None for an empty session.
#[tauri::command]
pub async fn export_all_images(app: tauri::AppHandle) -> Result<Option<String>, String> {
    let store = app.state::<SessionStore>();
    let records = store.records();
    info!("Exporting {} record(s) to archive", records.len());
    let dir = export_dir(&app);

    let path = tokio::task::spawn_blocking(move || export_archive(&records, &dir))
        .await
        .map_err(|e| format!("Task panicked: {}", e))?
        .map_err(String::from)?;

    Ok(path.map(|p| p.to_string_lossy().to_string()))
}
