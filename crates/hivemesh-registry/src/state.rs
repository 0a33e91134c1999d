use std::sync::Arc;

use hivemesh_store::{NodeStore, RequestStore};

#[derive(Clone)]
pub struct AppState {
    pub nodes: Arc<dyn NodeStore>,
    pub requests: Arc<dyn RequestStore>,
}
