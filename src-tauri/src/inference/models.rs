//! The model catalog offered in the UI.
//!
//! Embedded at compile time from `src-tauri/config/models.toml`. The core
//! never validates a model id beyond passing it through; the catalog only
//! drives the selector and the fallback default.

use serde::{Deserialize, Serialize};

const DEFAULT_MODELS: &str = include_str!("../../config/models.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct ModelCatalog {
    pub models: Vec<ModelEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default: bool,
}

/// Parse the embedded catalog.
///
/// # Panics
/// Panics if the embedded TOML is invalid (a compile-time bug).
pub fn model_catalog() -> ModelCatalog {
    toml::from_str(DEFAULT_MODELS).expect("embedded models.toml must be valid TOML")
}

/// Id of the catalog's default model (first entry marked `default`, or
/// simply the first entry).
pub fn default_model_id() -> String {
    let catalog = model_catalog();
    catalog
        .models
        .iter()
        .find(|m| m.default)
        .or_else(|| catalog.models.first())
        .map(|m| m.id.clone())
        .expect("embedded models.toml must list at least one model")
}
