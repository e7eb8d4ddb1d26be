use std::sync::Arc;
use cubealg_core::{AlgorithmRepository, RandomSelectors};

/// Shared application state
pub struct AppState {
    repository: Arc<dyn AlgorithmRepository>,
    selectors: RandomSelectors,
}

impl AppState {
    pub fn new(repository: Arc<dyn AlgorithmRepository>, selectors: RandomSelectors) -> Self {
        Self {
            repository,
            selectors,
        }
    }

    pub fn repository(&self) -> &dyn AlgorithmRepository {
        self.repository.as_ref()
    }

    pub fn selectors(&self) -> &RandomSelectors {
        &self.selectors
    }
}
