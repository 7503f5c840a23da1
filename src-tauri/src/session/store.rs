//! In-memory session aggregate.
//!
//! One `SessionStore` lives in Tauri managed state for the whole process.
//! Every operation locks the inner mutex, mutates, and releases before
//! returning; nothing awaits while holding the lock, so callers never
//! observe a half-updated session.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::error::OncoscopeError;

use super::stats::derive_stats;
use super::types::{
    ActiveView, AnalysisStatus, Detection, ImageRecord, NewImage, RecordSnapshot,
};

struct SessionInner {
    images: Vec<ImageRecord>,
    active_id: Option<u64>,
    next_id: u64,
}

/// Clones share the same underlying session; the watch-folder callback
/// holds one while Tauri managed state holds another.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<SessionInner>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                images: Vec::new(),
                active_id: None,
                next_id: 1,
            })),
        }
    }

    /// Append new records in the given order, all `Pending`. Ids are
    /// assigned from a session-wide counter and never reused, even after
    /// removals.
    pub fn add_images(&self, sources: Vec<NewImage>) -> Vec<RecordSnapshot> {
        let mut inner = self.inner.lock().unwrap();
        let mut added = Vec::with_capacity(sources.len());
        for source in sources {
            let id = inner.next_id;
            inner.next_id += 1;
            let record = ImageRecord {
                id,
                display_name: source.display_name,
                source: Arc::new(source.bytes),
                detections: Vec::new(),
                status: AnalysisStatus::Pending,
                error: None,
                inference_time_ms: None,
                model_used: None,
            };
            added.push(snapshot_of(&record));
            inner.images.push(record);
        }
        info!("Added {} image(s) to session", added.len());
        added
    }

    /// Make a record the active one and clear its transient error display.
    pub fn set_active(&self, id: u64) -> Result<ActiveView, OncoscopeError> {
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .images
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(OncoscopeError::NotFound(id))?;
        record.error = None;
        let view = view_of(record);
        inner.active_id = Some(id);
        Ok(view)
    }

    pub fn active_id(&self) -> Option<u64> {
        self.inner.lock().unwrap().active_id
    }

    pub fn active_view(&self) -> Option<ActiveView> {
        let inner = self.inner.lock().unwrap();
        let id = inner.active_id?;
        inner.images.iter().find(|r| r.id == id).map(view_of)
    }

    /// Full view of any record, active or not.
    pub fn view(&self, id: u64) -> Option<ActiveView> {
        let inner = self.inner.lock().unwrap();
        inner.images.iter().find(|r| r.id == id).map(view_of)
    }

    /// Transition a record to `Analyzing`. At most one record may be
    /// analyzing at any time, whoever the caller is; a second attempt is
    /// rejected rather than racing two writers over the same session.
    pub fn mark_analyzing(&self, id: u64) -> Result<(), OncoscopeError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(busy) = inner
            .images
            .iter()
            .find(|r| r.status == AnalysisStatus::Analyzing)
        {
            return Err(OncoscopeError::Busy(format!(
                "image {} ({}) is still being analyzed",
                busy.id, busy.display_name
            )));
        }
        let record = inner
            .images
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(OncoscopeError::NotFound(id))?;
        record.status = AnalysisStatus::Analyzing;
        Ok(())
    }

    /// Apply a successful analysis outcome. Detections are replaced
    /// wholesale. Returns false (and changes nothing) when the record was
    /// removed while the request was in flight.
    pub fn record_result(
        &self,
        id: u64,
        detections: Vec<Detection>,
        inference_time_ms: f64,
        model_used: String,
    ) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.images.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.detections = detections;
                record.status = AnalysisStatus::Done;
                record.error = None;
                record.inference_time_ms = Some(inference_time_ms);
                record.model_used = Some(model_used);
                true
            }
            None => {
                warn!("Dropping analysis result for removed image {}", id);
                false
            }
        }
    }

    /// Apply a failed analysis outcome. Prior detections are kept: last
    /// known good state beats a blank slate.
    pub fn record_failure(&self, id: u64, reason: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.images.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.status = AnalysisStatus::Failed;
                record.error = Some(reason.to_string());
                true
            }
            None => {
                warn!("Dropping analysis failure for removed image {}", id);
                false
            }
        }
    }

    /// Remove one record. Removing the active record clears the active
    /// selection. Returns false if the id was already gone.
    pub fn remove_image(&self, id: u64) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.images.len();
        inner.images.retain(|r| r.id != id);
        let removed = inner.images.len() < before;
        if removed && inner.active_id == Some(id) {
            inner.active_id = None;
        }
        removed
    }

    pub fn clear_all(&self) {
        let mut inner = self.inner.lock().unwrap();
        let count = inner.images.len();
        inner.images.clear();
        inner.active_id = None;
        info!("Cleared session ({} image(s) removed)", count);
    }

    pub fn snapshots(&self) -> Vec<RecordSnapshot> {
        let inner = self.inner.lock().unwrap();
        inner.images.iter().map(snapshot_of).collect()
    }

    /// All record ids in session (= gallery) order.
    pub fn ids(&self) -> Vec<u64> {
        let inner = self.inner.lock().unwrap();
        inner.images.iter().map(|r| r.id).collect()
    }

    pub fn status_of(&self, id: u64) -> Option<AnalysisStatus> {
        let inner = self.inner.lock().unwrap();
        inner.images.iter().find(|r| r.id == id).map(|r| r.status)
    }

    /// Display name plus shared source bytes, for analysis and export.
    pub fn image_bytes(&self, id: u64) -> Option<(String, Arc<Vec<u8>>)> {
        let inner = self.inner.lock().unwrap();
        inner
            .images
            .iter()
            .find(|r| r.id == id)
            .map(|r| (r.display_name.clone(), r.source.clone()))
    }

    /// Owned clones of every record in session order. Source bytes are
    /// behind `Arc`, so this is cheap despite the signature.
    pub fn records(&self) -> Vec<ImageRecord> {
        let inner = self.inner.lock().unwrap();
        inner.images.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().images.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn snapshot_of(record: &ImageRecord) -> RecordSnapshot {
    RecordSnapshot {
        id: record.id,
        display_name: record.display_name.clone(),
        status: record.status,
        detection_count: record.detections.len(),
        error: record.error.clone(),
    }
}

fn view_of(record: &ImageRecord) -> ActiveView {
    ActiveView {
        id: record.id,
        display_name: record.display_name.clone(),
        status: record.status,
        detections: record.detections.clone(),
        stats: derive_stats(&record.detections),
        inference_time_ms: record.inference_time_ms,
        model_used: record.model_used.clone(),
        error: record.error.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(names: &[&str]) -> SessionStore {
        let store = SessionStore::new();
        store.add_images(
            names
                .iter()
                .map(|n| NewImage {
                    display_name: n.to_string(),
                    bytes: vec![0u8; 4],
                })
                .collect(),
        );
        store
    }

    fn sample_detections() -> Vec<Detection> {
        vec![Detection {
            label: "pni".to_string(),
            confidence: 80.0,
            polygon: vec![[10.0, 10.0], [20.0, 10.0], [20.0, 20.0], [10.0, 20.0]],
        }]
    }

    #[test]
    fn test_add_assigns_sequential_ids_in_order() {
        let store = store_with(&["a.png", "b.png", "c.png"]);
        let snaps = store.snapshots();
        assert_eq!(snaps.len(), 3);
        assert_eq!(snaps[0].id, 1);
        assert_eq!(snaps[1].id, 2);
        assert_eq!(snaps[2].id, 3);
        assert_eq!(snaps[0].display_name, "a.png");
        assert!(snaps.iter().all(|s| s.status == AnalysisStatus::Pending));
    }

    #[test]
    fn test_ids_are_never_reused_after_removal() {
        let store = store_with(&["a.png", "b.png"]);
        assert!(store.remove_image(2));
        let added = store.add_images(vec![NewImage {
            display_name: "c.png".to_string(),
            bytes: vec![1, 2, 3],
        }]);
        assert_eq!(added[0].id, 3);
    }

    #[test]
    fn test_set_active_unknown_id_fails() {
        let store = store_with(&["a.png"]);
        let err = store.set_active(99).unwrap_err();
        assert!(matches!(err, OncoscopeError::NotFound(99)));
        assert_eq!(store.active_id(), None);
    }

    #[test]
    fn test_set_active_clears_transient_error() {
        let store = store_with(&["a.png"]);
        store.mark_analyzing(1).unwrap();
        store.record_failure(1, "backend unreachable");
        assert!(store.snapshots()[0].error.is_some());

        let view = store.set_active(1).unwrap();
        assert_eq!(view.error, None);
        assert_eq!(view.status, AnalysisStatus::Failed);
    }

    #[test]
    fn test_result_for_removed_id_is_silent_noop() {
        let store = store_with(&["a.png", "b.png"]);
        store.mark_analyzing(1).unwrap();
        assert!(store.remove_image(1));

        let applied = store.record_result(1, sample_detections(), 12.0, "m".to_string());
        assert!(!applied);
        // The record must not be resurrected.
        assert_eq!(store.ids(), vec![2]);
    }

    #[test]
    fn test_failure_preserves_prior_detections() {
        let store = store_with(&["a.png"]);
        store.mark_analyzing(1).unwrap();
        store.record_result(1, sample_detections(), 10.0, "m".to_string());

        store.mark_analyzing(1).unwrap();
        store.record_failure(1, "timeout");

        let view = store.set_active(1).unwrap();
        assert_eq!(view.status, AnalysisStatus::Failed);
        assert_eq!(view.detections.len(), 1);
        assert_eq!(view.stats.avg_confidence, 80.0);
    }

    #[test]
    fn test_removing_active_clears_selection_and_stats() {
        let store = store_with(&["a.png"]);
        store.mark_analyzing(1).unwrap();
        store.record_result(1, sample_detections(), 10.0, "m".to_string());
        store.set_active(1).unwrap();

        assert!(store.remove_image(1));
        assert_eq!(store.active_id(), None);
        assert!(store.active_view().is_none());
    }

    #[test]
    fn test_only_one_record_analyzing_at_a_time() {
        let store = store_with(&["a.png", "b.png"]);
        store.mark_analyzing(1).unwrap();

        let err = store.mark_analyzing(2).unwrap_err();
        assert!(matches!(err, OncoscopeError::Busy(_)));
        assert_eq!(store.status_of(2), Some(AnalysisStatus::Pending));

        // Re-marking the in-flight record is rejected too.
        assert!(store.mark_analyzing(1).is_err());
    }

    #[test]
    fn test_clear_all_empties_session() {
        let store = store_with(&["a.png", "b.png"]);
        store.set_active(1).unwrap();
        store.clear_all();
        assert!(store.is_empty());
        assert_eq!(store.active_id(), None);
    }

    #[test]
    fn test_record_result_replaces_detections_wholesale() {
        let store = store_with(&["a.png"]);
        store.mark_analyzing(1).unwrap();
        store.record_result(1, sample_detections(), 10.0, "m".to_string());

        store.mark_analyzing(1).unwrap();
        store.record_result(1, Vec::new(), 8.0, "m".to_string());

        let view = store.set_active(1).unwrap();
        assert_eq!(view.status, AnalysisStatus::Done);
        assert!(view.detections.is_empty());
        assert_eq!(view.stats.normal_pct, 100.0);
    }
}
