use std::sync::Arc;

use crate::db::{InMemoryStore, RecommendationStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecommendationStore>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl AppState {
    pub fn new(store: Arc<dyn RecommendationStore>) -> Self {
        Self { store }
    }

    /// State backed by an empty process-local store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }
}
