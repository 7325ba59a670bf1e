//! Local Key/Value Store
//!
//! The client keeps its session between runs in a small string-keyed
//! store, the terminal counterpart of browser local storage:
//!
//! - **file**: JSON object on disk, one entry per key
//! - **memory**: process-local map, used in tests and for throwaway sessions
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust,no_run
//! use huntclub::storage::{FileStorage, Storage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let storage = FileStorage::new("./session.json");
//!     storage.set_item("access_token", "abc").await?;
//!     assert_eq!(storage.get_item("access_token").await?.as_deref(), Some("abc"));
//!     Ok(())
//! }
//! ```

pub mod error;
mod file;
mod memory;

pub use error::{StorageError, StorageResult};
pub use file::FileStorage;
pub use memory::MemoryStorage;

use async_trait::async_trait;

/// String-keyed persistent store
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read a value; `None` when the key was never set or was removed
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Insert or replace a value
    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a key; removing a missing key is not an error
    async fn remove_item(&self, key: &str) -> StorageResult<()>;
}
