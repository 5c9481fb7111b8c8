//! Shelf Core Library
//!
//! This crate provides the core functionality for Shelf, a local-first
//! manager for a personal book collection.
//!
//! # Architecture
//!
//! - **BookStore**: owns the collection in memory and is the only writer
//! - **SlotStore**: a key/value slot holding the serialized collection
//!
//! The collection is read once when the store is opened and rewritten on
//! every mutation.
//!
//! # Quick Start
//!
//! ```text
//! let mut store = BookStore::open_default()?;
//!
//! // Add a book
//! let book = store.add(NewBook::new("Dune", "Frank Herbert", 1965))?;
//!
//! // Query books
//! let hits = store.search("herbert");
//! ```
//!
//! # Modules
//!
//! - `store`: the book store (main entry point)
//! - `models`: book record, new-book values, patches and raw forms
//! - `validation`: field rules and error messages
//! - `dialog`: which dialog is open in an interactive front end
//! - `storage`: durable slots and the collection codec
//! - `config`: application configuration

pub mod config;
pub mod dialog;
pub mod models;
pub mod seed;
pub mod storage;
pub mod store;
pub mod validation;

pub use config::Config;
pub use dialog::DialogState;
pub use models::{Book, BookForm, BookPatch, NewBook};
pub use storage::{FileSlotStore, InMemorySlotStore, SlotStore, StorageError};
pub use store::{BookStore, StoreError, StoreOptions};
pub use validation::{Field, ValidationErrors};
