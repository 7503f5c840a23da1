use std::path::PathBuf;

use tauri::AppHandle;
use tauri_plugin_store::StoreExt;
use tracing::{info, warn};

use crate::inference::{default_model_id, DEFAULT_ENDPOINT};
use crate::session::ModelConfig;

#[tauri::command]
pub fn get_preference(app: AppHandle, key: &str) -> Result<Option<String>, String> {
    info!("Getting preference: {}", key);
    let store = app.store("preferences.json").map_err(|e| {
        warn!("Failed to open store: {}", e);
        e.to_string()
    })?;
    let value = store.get(key).and_then(|v| v.as_str().map(|s| s.to_string()));
    Ok(value)
}

#[tauri::command]
pub fn set_preference(app: AppHandle, key: &str, value: &str) -> Result<(), String> {
    info!("Setting preference: {} = {}", key, value);
    let store = app.store("preferences.json").map_err(|e| {
        warn!("Failed to open store: {}", e);
        e.to_string()
    })?;
    store.set(key, serde_json::json!(value));
    store.save().map_err(|e| {
        warn!("Failed to save store: {}", e);
        e.to_string()
    })
}

/// Validate and persist the inference service endpoint.
#[tauri::command]
pub fn set_inference_endpoint(app: AppHandle, endpoint: &str) -> Result<(), String> {
    let parsed =
        url::Url::parse(endpoint).map_err(|e| format!("Invalid endpoint URL: {}", e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(format!(
            "Unsupported endpoint scheme '{}': use http or https",
            parsed.scheme()
        ));
    }
    set_preference(app, "inference_endpoint", endpoint)
}

/// Read a string preference, swallowing store errors.
pub(crate) fn read_preference(app: &AppHandle, key: &str) -> Option<String> {
    let store = app.store("preferences.json").ok()?;
    store.get(key).and_then(|v| v.as_str().map(|s| s.to_string()))
}

/// Model and device selection from preferences, falling back to the
/// catalog default and the accelerator.
pub(crate) fn model_config(app: &AppHandle) -> ModelConfig {
    let model = read_preference(app, "selected_model")
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default_model_id);
    let use_accelerator = read_preference(app, "use_accelerator")
        .map(|v| v != "false")
        .unwrap_or(true);
    ModelConfig {
        model,
        use_accelerator,
    }
}

pub(crate) fn inference_endpoint(app: &AppHandle) -> String {
    read_preference(app, "inference_endpoint")
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
}

pub(crate) fn export_dir(app: &AppHandle) -> PathBuf {
    if let Some(dir) = read_preference(app, "export_dir").filter(|s| !s.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}
