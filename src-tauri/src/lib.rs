#![recursion_limit = "256"]

pub mod analysis;
mod commands;
mod error;
pub mod export;
pub mod import;
pub mod inference;
pub mod render;
pub mod session;
pub mod slide_watcher;

pub use error::OncoscopeError;

pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tauri::Builder::default()
        .plugin(tauri_plugin_store::Builder::new().build())
        .manage(session::SessionStore::new())
        .manage(analysis::InferenceGate::new())
        .manage(slide_watcher::SlideWatcherState::new())
        .invoke_handler(tauri::generate_handler![
            commands::session::add_images,
            commands::session::list_images,
            commands::session::set_active_image,
            commands::session::get_active_view,
            commands::session::get_image_data,
            commands::session::remove_image,
            commands::session::clear_session,
            commands::analyzer::analyze_image,
            commands::analyzer::analyze_batch,
            commands::export::export_active_image,
            commands::export::export_all_images,
            commands::import::import_folder,
            commands::config::get_preference,
            commands::config::set_preference,
            commands::config::set_inference_endpoint,
            commands::health::run_health_check,
            commands::models::list_models,
            commands::watcher::set_watch_dir,
            commands::watcher::get_watch_dir,
            commands::watcher::clear_watch_dir,
        ])
        .setup(|app| {
            // Restore slide watch directory from preferences
            use tauri::Manager;
            use tauri_plugin_store::StoreExt;
            if let Ok(store) = app.store("preferences.json") {
                if let Some(dir) = store
                    .get("watch_dir")
                    .and_then(|v| v.as_str().map(|s| s.to_string()))
                    .filter(|s| !s.is_empty())
                {
                    let session = app.state::<session::SessionStore>().inner().clone();
                    let state = app.state::<slide_watcher::SlideWatcherState>();
                    if let Err(e) = state.start_watching(&dir, session) {
                        tracing::warn!("Failed to restore slide watcher for {}: {}", dir, e);
                    }
                }
            }
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
