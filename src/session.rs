// src/session.rs

pub mod record;
pub mod storage;
pub mod store;
pub mod watcher;

pub use record::SessionRecord;
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
pub use store::{SessionStore, SESSION_KEY, STORAGE_PREFIX};
pub use watcher::{SessionEvent, SessionWatcher, EXPIRY_POLL_INTERVAL};
