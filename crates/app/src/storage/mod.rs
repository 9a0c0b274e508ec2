//! Key-value persistence
//!
//! Client state (cart, product cache, auth session) is kept as one JSON document per key. Any
//! backend offering get/set/remove/clear by key can stand in: [`MemoryStore`] for tests and
//! ephemeral sessions, [`FileStore`] for a directory on disk.

use std::fmt::Debug;

mod document;
mod errors;
mod file;
mod memory;

pub use document::{DOCUMENT_VERSION, load_document, save_document};
pub use errors::StorageError;
pub use file::FileStore;
pub use memory::MemoryStore;

/// Well-known storage keys.
pub mod keys {
    /// Persisted cart lines.
    pub const CART: &str = "apotheca.cart";

    /// Persisted product snapshots.
    pub const PRODUCTS: &str = "apotheca.products";

    /// Persisted auth session.
    pub const SESSION: &str = "apotheca.session";
}

/// String key-value storage.
pub trait KeyValueStore: Debug + Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Delete every key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn clear(&self) -> Result<(), StorageError>;
}
