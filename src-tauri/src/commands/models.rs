use serde::Serialize;
use tracing::info;

use crate::inference::model_catalog;

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub default: bool,
}

/// List the models the inference service can run, from the embedded
/// catalog.
#[tauri::command]
pub fn list_models() -> Result<Vec<ModelInfo>, String> {
    let catalog = model_catalog();
    let models: Vec<ModelInfo> = catalog
        .models
        .iter()
        .map(|m| ModelInfo {
            id: m.id.clone(),
            name: m.name.clone(),
            description: m.description.clone(),
            default: m.default,
        })
        .collect();
    info!("Listing {} available model(s)", models.len());
    Ok(models)
}
