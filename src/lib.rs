pub mod app;
pub mod config;
pub mod date_stamp;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod progress;
pub mod rules;
pub mod state;
pub mod stats;
pub mod storage;
pub mod store;

pub use app::router;
pub use config::Config;
pub use date_stamp::DateStamp;
pub use errors::{HabitError, StorageError};
pub use state::AppState;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::HabitStore;
