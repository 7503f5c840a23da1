use serde::Serialize;
use tauri::Manager;
use tracing::info;

use crate::commands::config::{export_dir, inference_endpoint};
use crate::inference::{model_catalog, InferenceClient};
use crate::slide_watcher::SlideWatcherState;

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub endpoint: String,
    pub endpoint_reachable: bool,
    pub export_dir_accessible: bool,
    pub export_dir_path: Option<String>,
    pub watch_dir: Option<String>,
    pub watcher_active: bool,
    pub models_available: usize,
}

#[tauri::command]
pub async fn run_health_check(app: tauri::AppHandle) -> Result<HealthReport, String> {
    info!("Running health check");

    // Probe the inference service
    let endpoint = inference_endpoint(&app);
    let endpoint_reachable = match InferenceClient::new(&endpoint) {
        Ok(client) => client.ping().await.is_ok(),
        Err(_) => false,
    };
    info!("Inference service reachable: {}", endpoint_reachable);

    // Check export destination
    let dir = export_dir(&app);
    let export_dir_accessible = dir.exists() && dir.is_dir();
    info!(
        "Export directory accessible: {} at {:?}",
        export_dir_accessible, dir
    );

    // Watch folder status
    let watcher = app.state::<SlideWatcherState>();
    let watch_dir = watcher.watch_dir.lock().unwrap().clone();
    let watcher_active = watcher.is_watching();

    let models_available = model_catalog().models.len();

    Ok(HealthReport {
        endpoint,
        endpoint_reachable,
        export_dir_accessible,
        export_dir_path: if export_dir_accessible {
            Some(dir.to_string_lossy().to_string())
        } else {
            None
        },
        watch_dir,
        watcher_active,
        models_available,
    })
}
