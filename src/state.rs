use crate::storage::FileStore;
use crate::store::HabitStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<HabitStore<FileStore>>,
}

impl AppState {
    pub fn new(store: HabitStore<FileStore>) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}
