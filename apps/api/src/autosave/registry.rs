use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::autosave::coordinator::{AutosaveCoordinator, AutosaveStatus, CompletionMode, SaveSink};
use crate::cv::models::CvDocument;
use crate::cv::store::DraftStore;
use crate::errors::AppError;

/// Writes coalesced drafts through to the draft store.
struct DraftSink {
    store: Arc<dyn DraftStore>,
}

#[async_trait]
impl SaveSink<CvDocument> for DraftSink {
    async fn save(&self, doc: CvDocument) -> Result<(), AppError> {
        self.store.upsert(&doc).await?;
        Ok(())
    }
}

/// Coordinators kept before idle ones are evicted to make room.
pub const DEFAULT_REGISTRY_CAPACITY: usize = 1024;

/// One autosave coordinator per CV, created on first edit.
///
/// Once the map reaches its capacity, adding a coordinator first drops every
/// idle one. An evicted CV reports an idle status without `last_saved_at`
/// until it is edited again.
#[derive(Clone)]
pub struct AutosaveRegistry {
    sink: Arc<DraftSink>,
    quiet_period: Duration,
    mode: CompletionMode,
    capacity: usize,
    coordinators: Arc<Mutex<HashMap<Uuid, Arc<AutosaveCoordinator<CvDocument>>>>>,
}

impl AutosaveRegistry {
    pub fn new(store: Arc<dyn DraftStore>, quiet_period: Duration, mode: CompletionMode) -> Self {
        Self {
            sink: Arc::new(DraftSink { store }),
            quiet_period,
            mode,
            capacity: DEFAULT_REGISTRY_CAPACITY,
            coordinators: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    fn coordinator_for(&self, cv_id: Uuid) -> Arc<AutosaveCoordinator<CvDocument>> {
        let mut coordinators = self
            .coordinators
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !coordinators.contains_key(&cv_id) && coordinators.len() >= self.capacity {
            let before = coordinators.len();
            coordinators.retain(|_, c| c.is_auto_saving());
            debug!(
                "Evicted {} idle autosave coordinators",
                before - coordinators.len()
            );
        }
        let coordinator = coordinators.entry(cv_id).or_insert_with(|| {
            let sink: Arc<dyn SaveSink<CvDocument>> = self.sink.clone();
            Arc::new(AutosaveCoordinator::new(sink, self.quiet_period).with_mode(self.mode))
        });
        Arc::clone(coordinator)
    }

    /// Queues `doc` on its own coordinator and returns the resulting status.
    pub fn trigger(&self, doc: CvDocument) -> AutosaveStatus {
        let coordinator = self.coordinator_for(doc.id);
        coordinator.trigger(doc);
        coordinator.status()
    }

    /// Status for a CV; idle if it has not been edited since startup.
    pub fn status(&self, cv_id: Uuid) -> AutosaveStatus {
        let coordinators = self
            .coordinators
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        coordinators
            .get(&cv_id)
            .map(|c| c.status())
            .unwrap_or_else(|| AutosaveStatus::idle(self.quiet_period))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autosave::coordinator::AutosavePhase;
    use crate::cv::models::CvContent;
    use crate::cv::store::MemoryDraftStore;

    /// Delays each write by its full name: "slow" takes 500ms, anything else 50ms.
    struct SlowStore {
        inner: Arc<MemoryDraftStore>,
    }

    #[async_trait]
    impl DraftStore for SlowStore {
        async fn upsert(&self, doc: &CvDocument) -> Result<Option<i32>, AppError> {
            let latency = if doc.content.personal.full_name == "slow" { 500 } else { 50 };
            tokio::time::sleep(Duration::from_millis(latency)).await;
            self.inner.upsert(doc).await
        }

        async fn load(&self, user_id: Uuid, cv_id: Uuid) -> Result<Option<CvDocument>, AppError> {
            self.inner.load(user_id, cv_id).await
        }

        async fn list(&self, user_id: Uuid) -> Result<Vec<crate::cv::models::CvSummary>, AppError> {
            self.inner.list(user_id).await
        }
    }

    fn registry(store: &Arc<MemoryDraftStore>) -> AutosaveRegistry {
        AutosaveRegistry::new(
            store.clone(),
            Duration::from_millis(100),
            CompletionMode::GracePeriod,
        )
    }

    fn draft(user_id: Uuid, name: &str) -> CvDocument {
        let mut content = CvContent::default();
        content.personal.full_name = name.to_string();
        CvDocument::new(user_id, "classic", content)
    }

    #[tokio::test(start_paused = true)]
    async fn test_untouched_cv_is_idle() {
        let store = Arc::new(MemoryDraftStore::new());
        let status = registry(&store).status(Uuid::new_v4());
        assert_eq!(status.phase, AutosavePhase::Idle);
        assert_eq!(status.quiet_period_ms, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_coalesce_into_store() {
        let store = Arc::new(MemoryDraftStore::new());
        let registry = registry(&store);
        let mut doc = draft(Uuid::new_v4(), "Draft 1");

        assert!(registry.trigger(doc.clone()).is_saving);
        doc.content.personal.full_name = "Draft 2".into();
        registry.trigger(doc.clone());
        assert!(store.load(doc.user_id, doc.id).await.unwrap().is_none());

        tokio::time::sleep(Duration::from_millis(300)).await;

        let saved = store.load(doc.user_id, doc.id).await.unwrap().unwrap();
        assert_eq!(saved.content.personal.full_name, "Draft 2");
        let summaries = store.list(doc.user_id).await.unwrap();
        assert_eq!(summaries[0].version, 1);
        assert!(registry.status(doc.id).last_saved_at.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_coordinators_evicted_at_capacity() {
        let store = Arc::new(MemoryDraftStore::new());
        let registry = registry(&store).with_capacity(2);
        let user_id = Uuid::new_v4();
        let first = draft(user_id, "First");
        let second = draft(user_id, "Second");
        let third = draft(user_id, "Third");

        registry.trigger(first.clone());
        tokio::time::sleep(Duration::from_millis(300)).await;
        registry.trigger(second.clone());
        registry.trigger(third.clone());

        // "first" was idle and made room; "second" is still pending and kept.
        assert!(registry.status(first.id).last_saved_at.is_none());
        assert!(registry.status(second.id).is_saving);
        assert!(registry.status(third.id).is_saving);
        assert_eq!(registry.coordinators.lock().unwrap().len(), 2);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(store.load(user_id, second.id).await.unwrap().is_some());
        assert!(store.load(user_id, third.id).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_mode_out_of_order_landing_keeps_newest() {
        let memory = Arc::new(MemoryDraftStore::new());
        let store = Arc::new(SlowStore {
            inner: memory.clone(),
        });
        let registry = AutosaveRegistry::new(
            store,
            Duration::from_millis(100),
            CompletionMode::AwaitSave,
        );
        let older = draft(Uuid::new_v4(), "slow");
        let mut newer = older.clone();
        newer.content.personal.full_name = "fast".into();
        newer.updated_at += chrono::Duration::seconds(1);

        registry.trigger(older.clone());
        tokio::time::sleep(Duration::from_millis(150)).await;
        registry.trigger(newer.clone());

        // "fast" lands at 300ms, "slow" at 600ms and must be skipped.
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(registry.status(older.id).last_saved_at.is_some());
        tokio::time::sleep(Duration::from_millis(200)).await;

        let saved = memory.load(older.user_id, older.id).await.unwrap().unwrap();
        assert_eq!(saved.content.personal.full_name, "fast");
        assert!(!registry.status(older.id).is_saving);
    }

    #[tokio::test(start_paused = true)]
    async fn test_documents_do_not_share_timers() {
        let store = Arc::new(MemoryDraftStore::new());
        let registry = registry(&store);
        let user_id = Uuid::new_v4();
        let first = draft(user_id, "First");
        let second = draft(user_id, "Second");

        registry.trigger(first.clone());
        tokio::time::sleep(Duration::from_millis(50)).await;
        registry.trigger(second.clone());
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(store.load(user_id, first.id).await.unwrap().is_some());
        assert!(store.load(user_id, second.id).await.unwrap().is_some());
    }
}
