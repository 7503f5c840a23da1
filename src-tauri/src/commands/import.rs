use std::path::Path;

use tauri::State;
use tracing::info;

use crate::session::{RecordSnapshot, SessionStore};

/// Import every image at the top level of `path` into the session as
/// pending records.
#[tauri::command]
pub async fn import_folder(
    state: State<'_, SessionStore>,
    path: String,
) -> Result<Vec<RecordSnapshot>, String> {
    info!("Importing folder: {}", path);
    let store = state.inner().clone();
    tokio::task::spawn_blocking(move || {
        crate::import::import_folder(&store, Path::new(&path)).map_err(String::from)
    })
    .await
    .map_err(|e| format!("Task panicked: {}", e))?
}
