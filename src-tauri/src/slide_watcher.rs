use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};

use crate::import::is_image_path;
use crate::session::{NewImage, SessionStore};

/// Shared state for the watch-folder importer.
pub struct SlideWatcherState {
    pub watcher: Mutex<Option<RecommendedWatcher>>,
    pub watch_dir: Mutex<Option<String>>,
    ingested: Arc<Mutex<HashSet<PathBuf>>>,
}

impl SlideWatcherState {
    pub fn new() -> Self {
        Self {
            watcher: Mutex::new(None),
            watch_dir: Mutex::new(None),
            ingested: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Start watching a directory for new slide images. Arrivals are read
    /// and appended to the session as pending records; analysis stays a
    /// manual step.
    pub fn start_watching(&self, dir: &str, store: SessionStore) -> Result<(), String> {
        let dir_path = PathBuf::from(dir);
        if !dir_path.exists() || !dir_path.is_dir() {
            return Err(format!("Directory does not exist: {}", dir));
        }

        // Stop existing watcher
        self.stop_watching();

        let ingested = self.ingested.clone();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    if matches!(event.kind, EventKind::Create(_)) {
                        for path in &event.paths {
                            if !is_image_path(path) {
                                continue;
                            }

                            // Some platforms emit several Create events per file
                            if let Ok(mut seen) = ingested.lock() {
                                if !seen.insert(path.clone()) {
                                    continue;
                                }
                            }

                            let display_name = path
                                .file_name()
                                .and_then(|n| n.to_str())
                                .unwrap_or("slide")
                                .to_string();

                            match std::fs::read(path) {
                                Ok(bytes) => {
                                    info!("Slide arrived in watch folder: {}", display_name);
                                    store.add_images(vec![NewImage {
                                        display_name,
                                        bytes,
                                    }]);
                                }
                                Err(e) => {
                                    warn!("Could not read watched file {:?}: {}", path, e);
                                    // Leave it eligible for a later event
                                    if let Ok(mut seen) = ingested.lock() {
                                        seen.remove(path);
                                    }
                                }
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!("File watcher error: {}", e);
                }
            }
        })
        .map_err(|e| format!("Failed to create file watcher: {}", e))?;

        watcher
            .watch(&dir_path, RecursiveMode::NonRecursive)
            .map_err(|e| format!("Failed to watch directory: {}", e))?;

        *self.watcher.lock().unwrap() = Some(watcher);
        *self.watch_dir.lock().unwrap() = Some(dir.to_string());

        info!("Watching for new slides in: {}", dir);
        Ok(())
    }

    /// Stop the current watcher, if any.
    pub fn stop_watching(&self) {
        *self.watcher.lock().unwrap() = None;
        *self.watch_dir.lock().unwrap() = None;
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.lock().unwrap().is_some()
    }
}

impl Default for SlideWatcherState {
    fn default() -> Self {
        Self::new()
    }
}
