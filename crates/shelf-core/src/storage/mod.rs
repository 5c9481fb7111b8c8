//! Storage layer
//!
//! Books live in a named durable slot: a key/value area that holds one JSON
//! document per key.
//!
//! ## Backends
//!
//! - [`FileSlotStore`]: one file per key under the data directory, written
//!   atomically
//! - [`InMemorySlotStore`]: process-local, used by tests and as a scratch
//!   area
//!
//! The whole collection is rewritten on every save; there is no incremental
//! or append mode.

pub mod codec;
pub mod error;
pub mod file;
pub mod memory;

pub use codec::{decode_books, encode_books};
pub use error::{Access, StorageError, StorageResult};
pub use file::{is_valid_key, FileSlotStore};
pub use memory::InMemorySlotStore;

/// Object-safe key/value storage for serialized collections
///
/// Implementations use interior mutability so a single store can be shared
/// between several owners through an `Arc`.
pub trait SlotStore: Send + Sync {
    /// Retrieve the value stored under `key`, or `None` if the slot is empty
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, overwriting any previous value
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Empty the slot. Removing an empty slot is not an error.
    fn remove_item(&self, key: &str) -> StorageResult<()>;
}
