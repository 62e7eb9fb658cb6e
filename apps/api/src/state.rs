use std::sync::Arc;

use crate::autosave::AutosaveRegistry;
use crate::config::Config;
use crate::cv::store::DraftStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable draft store. Postgres when `DATABASE_URL` is set, in-memory otherwise.
    pub store: Arc<dyn DraftStore>,
    /// Per-CV debounced autosave, writing through `store`.
    pub autosave: AutosaveRegistry,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn DraftStore>, config: Config) -> Self {
        let autosave = AutosaveRegistry::new(
            Arc::clone(&store),
            config.autosave_quiet_period,
            config.autosave_mode,
        );
        Self {
            store,
            autosave,
            config,
        }
    }
}
