//! Tauri commands driving slide analysis.
//!
//! Model, device, and endpoint come from preferences at call time, so a
//! settings change applies to the next dispatch without a restart.

use tauri::Manager;
use tracing::info;

use crate::analysis::{self, BatchSummary, InferenceGate};
use crate::commands::config::{inference_endpoint, model_config};
use crate::inference::InferenceClient;
use crate::session::{ActiveView, SessionStore};

/// Analyze one record against the inference service. Rejected while any
/// other analysis is in flight.
#[tauri::command]
pub async fn analyze_image(app: tauri::AppHandle, id: u64) -> Result<ActiveView, String> {
    info!("Starting analysis of image {}", id);

    let config = model_config(&app);
    let client = InferenceClient::new(&inference_endpoint(&app)).map_err(String::from)?;
    let store = app.state::<SessionStore>();
    let gate = app.state::<InferenceGate>();

    analysis::analyze_one(&store, &gate, &client, id, &config)
        .await
        .map_err(String::from)?;

    store
        .view(id)
        .ok_or_else(|| format!("No image with id {} in the current session", id))
}

/// Analyze several records strictly one after another. Each request
/// settles before the next is dispatched; ids no longer in the session
/// are skipped and counted.
#[tauri::command]
pub async fn analyze_batch(app: tauri::AppHandle, ids: Vec<u64>) -> Result<BatchSummary, String> {
    let config = model_config(&app);
    let client = InferenceClient::new(&inference_endpoint(&app)).map_err(String::from)?;
    let store = app.state::<SessionStore>();
    let gate = app.state::<InferenceGate>();

    analysis::analyze_batch(&store, &gate, &client, ids, &config)
        .await
        .map_err(String::from)
}
