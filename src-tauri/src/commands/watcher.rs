use tauri::Manager;
use tauri_plugin_store::StoreExt;
use tracing::info;

use crate::session::SessionStore;
use crate::slide_watcher::SlideWatcherState;

/// Set the slide watch directory and start watching.
#[tauri::command]
pub async fn set_watch_dir(app: tauri::AppHandle, path: String) -> Result<(), String> {
    info!("Setting slide watch directory to: {}", path);

    // Save preference
    if let Ok(store) = app.store("preferences.json") {
        store.set("watch_dir", serde_json::Value::String(path.clone()));
    }

    // Start watching
    let session = app.state::<SessionStore>().inner().clone();
    let state = app.state::<SlideWatcherState>();
    state.start_watching(&path, session)?;

    Ok(())
}

/// Get the current slide watch directory.
#[tauri::command]
pub async fn get_watch_dir(app: tauri::AppHandle) -> Result<Option<String>, String> {
    let state = app.state::<SlideWatcherState>();
    let dir = state.watch_dir.lock().unwrap().clone();
    Ok(dir)
}

/// Stop watching and forget the stored directory.
#[tauri::command]
pub async fn clear_watch_dir(app: tauri::AppHandle) -> Result<(), String> {
    info!("Clearing slide watch directory");
    let state = app.state::<SlideWatcherState>();
    state.stop_watching();
    if let Ok(store) = app.store("preferences.json") {
        store.delete("watch_dir");
    }
    Ok(())
}
