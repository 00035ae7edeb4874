//! Shared application state for all routes.

use crate::service::StudentService;
use crate::store::StudentStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub students: StudentService,
}

impl AppState {
    pub fn new(store: Arc<dyn StudentStore>) -> Self {
        Self {
            students: StudentService::new(store),
        }
    }
}
