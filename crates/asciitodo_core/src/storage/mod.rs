use crate::error::AppError;

pub mod file_store;
pub mod memory;
pub mod persistence;

pub use file_store::FileStore;
pub use memory::MemoryStore;

/// Synchronous string-keyed store, the shape of a browser's local storage.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppError>;

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), AppError>;
}
