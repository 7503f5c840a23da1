//! Drives inference for a single slide or a whole gallery.
//!
//! The backend is assumed single-capacity (one GPU), so dispatch runs
//! through one global slot: a batch is strictly sequential, and a manual
//! analysis while anything is in flight is rejected instead of queued.
//! Because dispatch is serialized, results apply to the session in
//! submission order; a stale response can never overwrite a fresher one.

use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::error::OncoscopeError;
use crate::inference::InferenceClient;
use crate::session::types::ModelConfig;
use crate::session::SessionStore;

/// Single-capacity slot for talking to the inference service. Owning the
/// guard is the permission to dispatch.
pub struct InferenceGate {
    slot: Mutex<()>,
}

impl InferenceGate {
    pub fn new() -> Self {
        Self { slot: Mutex::new(()) }
    }

    /// Take the slot without waiting. Rejection means some analysis is
    /// already in flight.
    pub fn try_acquire(&self) -> Result<MutexGuard<'_, ()>, OncoscopeError> {
        self.slot.try_lock().map_err(|_| {
            OncoscopeError::Busy(
                "an analysis is already in flight; wait for it to finish".to_string(),
            )
        })
    }
}

impl Default for InferenceGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one record within a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub id: u64,
    pub display_name: String,
    pub success: bool,
    pub detection_count: Option<usize>,
    pub error: Option<String>,
}

/// Result of a whole batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub completed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub results: Vec<BatchEntry>,
}

/// Analyze one record. Exactly one request is issued; the record's status
/// reflects the outcome even when this returns an error.
pub async fn analyze_one(
    store: &SessionStore,
    gate: &InferenceGate,
    client: &InferenceClient,
    id: u64,
    config: &ModelConfig,
) -> Result<(), OncoscopeError> {
    let _slot = gate.try_acquire()?;
    run_record(store, client, id, config).await
}

/// Analyze `ids` strictly sequentially: each request settles (success or
/// failure) before the next is dispatched. One failing record is recorded
/// as failed and the batch moves on; removed ids are skipped.
pub async fn analyze_batch(
    store: &SessionStore,
    gate: &InferenceGate,
    client: &InferenceClient,
    ids: Vec<u64>,
    config: &ModelConfig,
) -> Result<BatchSummary, OncoscopeError> {
    let _slot = gate.try_acquire()?;

    let total = ids.len();
    info!(
        "Batch analysis of {} image(s) with model '{}'",
        total, config.model
    );

    let mut results = Vec::with_capacity(total);
    let mut succeeded = 0usize;
    let mut failed = 0usize;
    let mut skipped = 0usize;

    for id in ids {
        let Some((display_name, bytes)) = store.image_bytes(id) else {
            warn!("Skipping image {}: removed from session", id);
            skipped += 1;
            continue;
        };
        if let Err(e) = store.mark_analyzing(id) {
            warn!("Skipping image {} ({}): {}", id, display_name, e);
            skipped += 1;
            continue;
        }

        match client.infer(&display_name, bytes.as_ref().clone(), config).await {
            Ok(outcome) => {
                let count = outcome.detections.len();
                let applied = store.record_result(
                    id,
                    outcome.detections,
                    outcome.inference_time_ms,
                    outcome.model_used,
                );
                if applied {
                    succeeded += 1;
                    results.push(BatchEntry {
                        id,
                        display_name,
                        success: true,
                        detection_count: Some(count),
                        error: None,
                    });
                } else {
                    skipped += 1;
                }
            }
            Err(e) => {
                let reason = e.to_string();
                warn!("Analysis failed for '{}' ({}): {}", display_name, id, reason);
                if store.record_failure(id, &reason) {
                    failed += 1;
                    results.push(BatchEntry {
                        id,
                        display_name,
                        success: false,
                        detection_count: None,
                        error: Some(reason),
                    });
                } else {
                    skipped += 1;
                }
            }
        }
    }

    info!(
        "Batch complete: {} total, {} succeeded, {} failed, {} skipped",
        total, succeeded, failed, skipped
    );

    Ok(BatchSummary {
        total,
        completed: succeeded + failed,
        succeeded,
        failed,
        skipped,
        results,
    })
}

async fn run_record(
    store: &SessionStore,
    client: &InferenceClient,
    id: u64,
    config: &ModelConfig,
) -> Result<(), OncoscopeError> {
    let (display_name, bytes) = store
        .image_bytes(id)
        .ok_or(OncoscopeError::NotFound(id))?;
    store.mark_analyzing(id)?;

    match client.infer(&display_name, bytes.as_ref().clone(), config).await {
        Ok(outcome) => {
            store.record_result(
                id,
                outcome.detections,
                outcome.inference_time_ms,
                outcome.model_used,
            );
            Ok(())
        }
        Err(e) => {
            store.record_failure(id, &e.to_string());
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_gate_is_single_capacity() {
        let gate = InferenceGate::new();
        let held = gate.try_acquire().unwrap();
        assert!(matches!(gate.try_acquire(), Err(OncoscopeError::Busy(_))));
        drop(held);
        assert!(gate.try_acquire().is_ok());
    }
}
