use std::sync::Arc;

use crate::registry::Registry;

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
}

impl AppState {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}
