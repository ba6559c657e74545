use std::sync::Arc;

use crate::services::{producer::Producer, queue::JobQueue, store::StatusStore};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<JobQueue>,
    pub store: Arc<StatusStore>,
    pub producer: Arc<Producer>,
}

impl AppState {
    pub fn new(queue: JobQueue, store: StatusStore) -> Self {
        let queue = Arc::new(queue);
        let store = Arc::new(store);
        let producer = Arc::new(Producer::new(queue.clone(), store.clone()));
        Self {
            queue,
            store,
            producer,
        }
    }
}
