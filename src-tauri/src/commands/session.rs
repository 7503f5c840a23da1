//! Tauri commands over the in-memory review session.

use base64::Engine;
use serde::{Deserialize, Serialize};
use tauri::State;
use tracing::info;

use crate::inference::client::mime_for;
use crate::session::{ActiveView, NewImage, RecordSnapshot, SessionStore};

/// One image as uploaded from the frontend (FileReader output).
#[derive(Debug, Deserialize)]
pub struct IncomingImage {
    pub file_name: String,
    pub bytes_base64: String,
}

/// Source bytes handed back to the frontend for display.
#[derive(Debug, Serialize)]
pub struct ImagePayload {
    pub bytes_base64: String,
    pub mime: String,
}

/// Append uploaded images to the session, in the given order, as pending
/// records.
#[tauri::command]
pub fn add_images(
    state: State<'_, SessionStore>,
    images: Vec<IncomingImage>,
) -> Result<Vec<RecordSnapshot>, String> {
    info!("Adding {} image(s) to session", images.len());

    let mut batch = Vec::with_capacity(images.len());
    for image in images {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&image.bytes_base64)
            .map_err(|e| format!("Invalid base64 image data for '{}': {}", image.file_name, e))?;
        batch.push(NewImage {
            display_name: image.file_name,
            bytes,
        });
    }

    Ok(state.add_images(batch))
}

#[tauri::command]
pub fn list_images(state: State<'_, SessionStore>) -> Result<Vec<RecordSnapshot>, String> {
    Ok(state.snapshots())
}

/// Make a record the active one and return its full view.
#[tauri::command]
pub fn set_active_image(
    state: State<'_, SessionStore>,
    id: u64,
) -> Result<ActiveView, String> {
    state.set_active(id).map_err(String::from)
}

#[tauri::command]
pub fn get_active_view(state: State<'_, SessionStore>) -> Result<Option<ActiveView>, String> {
    Ok(state.active_view())
}

/// Original source bytes of a record, base64-encoded for an `<img>` data
/// URL on the frontend.
#[tauri::command]
pub fn get_image_data(state: State<'_, SessionStore>, id: u64) -> Result<ImagePayload, String> {
    let (display_name, bytes) = state
        .image_bytes(id)
        .ok_or_else(|| format!("No image with id {} in the current session", id))?;
    Ok(ImagePayload {
        bytes_base64: base64::engine::general_purpose::STANDARD.encode(bytes.as_slice()),
        mime: mime_for(&display_name).to_string(),
    })
}

/// Remove one record. Returns whether anything was removed.
#[tauri::command]
pub fn remove_image(state: State<'_, SessionStore>, id: u64) -> Result<bool, String> {
    info!("Removing image {} from session", id);
    Ok(state.remove_image(id))
}

/// Drop every record and the active selection.
#[tauri::command]
pub fn clear_session(state: State<'_, SessionStore>) -> Result<(), String> {
    info!("Clearing session");
    state.clear_all();
    Ok(())
}
