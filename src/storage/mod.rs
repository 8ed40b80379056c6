mod local;
mod memory;

pub use local::LocalStorage;
pub use memory::MemoryStore;

use crate::error::Result;

/// String-keyed durable storage holding one serialized value per key.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}
