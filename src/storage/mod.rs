//! Storage abstractions for the post snapshot cache.
//!
//! The cache lives in a single key-value slot holding serialized JSON:
//!
//! ```text
//! {root}/
//! └── templates.json        # {"data": [Post...], "timestamp": <epoch millis>}
//! ```

pub mod cache;
pub mod local;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use cache::{CacheStatus, PostCache};
pub use local::LocalStorage;
pub use memory::MemoryStorage;

/// Trait for key-value slot backends.
///
/// Last write wins; backends add no locking beyond what the medium provides.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a slot, returning `None` if it doesn't exist.
    async fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace a slot's value.
    async fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a slot. Missing slots are not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
