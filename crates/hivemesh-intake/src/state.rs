use std::sync::Arc;

use hivemesh_store::RequestStore;

#[derive(Clone)]
pub struct AppState {
    pub requests: Arc<dyn RequestStore>,
}
