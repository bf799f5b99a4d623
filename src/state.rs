//! Shared application state for all routes.

use crate::store::PersonStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Built once by the composition root and shared by every request.
    pub store: Arc<dyn PersonStore>,
}

impl AppState {
    pub fn new<S: PersonStore + 'static>(store: S) -> Self {
        AppState {
            store: Arc::new(store),
        }
    }
}
