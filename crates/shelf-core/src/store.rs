//! Book store
//!
//! The `BookStore` is the single source of truth for the book collection.
//! It loads the collection from a durable slot once, when it is opened, and
//! rewrites the whole collection to the slot after every mutation.
//!
//! ## Error state
//!
//! Load failures, unknown ids on update and failed writes are recorded as a
//! human-readable message available from [`BookStore::error`], and are also
//! returned to the caller. Validation errors are only returned: they are
//! reported before anything is mutated and leave the error state alone.
//! Nothing is retried.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = BookStore::open_with_config(&config);
//!
//! let book = store.add(NewBook::new("Dune", "Frank Herbert", 1965))?;
//! store.update(&book.id, BookPatch::new().genre(Some("Science Fiction".into())))?;
//!
//! let hits = store.search("fiction");
//! ```

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::{Book, BookPatch, NewBook};
use crate::seed;
use crate::storage::{codec, FileSlotStore, SlotStore, StorageError};
use crate::validation::{self, ValidationErrors};

/// Errors reported by store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// The persisted collection could not be read or parsed at startup
    #[error("Failed to load books from storage: {details}")]
    LoadFailure { details: String },

    /// An update targeted an unknown id
    #[error("Book not found")]
    NotFound { id: String },

    /// Field values failed validation; nothing was changed
    #[error("Invalid book: {0}")]
    ValidationFailure(ValidationErrors),

    /// The collection changed in memory but could not be written to the slot
    #[error("Failed to save books to storage: {0}")]
    PersistFailure(#[source] StorageError),
}

/// Options applied when a store is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Write the example books when the slot is empty
    pub seed_examples: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            seed_examples: true,
        }
    }
}

impl From<&Config> for StoreOptions {
    fn from(config: &Config) -> Self {
        Self {
            seed_examples: config.seed_examples,
        }
    }
}

/// The book collection and its persistence
pub struct BookStore {
    books: Vec<Book>,
    loading: bool,
    error: Option<String>,
    slots: Arc<dyn SlotStore>,
    key: String,
}

impl BookStore {
    /// Open the store on a slot, loading or seeding the collection
    ///
    /// On first use (empty slot) the example books are written, unless
    /// seeding is disabled, in which case an empty collection is written.
    /// A slot that cannot be read or parsed leaves the collection empty and
    /// records a load failure; it is not repaired.
    pub fn open(slots: Arc<dyn SlotStore>, key: impl Into<String>, options: StoreOptions) -> Self {
        let mut store = Self {
            books: Vec::new(),
            loading: false,
            error: None,
            slots,
            key: key.into(),
        };
        store.initialize(options);
        store
    }

    /// Open the store in the configured data directory
    pub fn open_with_config(config: &Config) -> Self {
        let slots = Arc::new(FileSlotStore::new(config.data_dir.clone()));
        Self::open(slots, config.storage_key.clone(), StoreOptions::from(config))
    }

    /// Load the default configuration and open the store
    pub fn open_default() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Ok(Self::open_with_config(&config))
    }

    fn initialize(&mut self, options: StoreOptions) {
        self.loading = true;
        match self.read_slot() {
            Ok(Some(books)) => self.books = books,
            Ok(None) => {
                self.books = if options.seed_examples {
                    seed::example_books(Utc::now())
                } else {
                    Vec::new()
                };
                info!(
                    "Initialized empty slot '{}' with {} book(s)",
                    self.key,
                    self.books.len()
                );
                if self.persist().is_err() {
                    warn!("Example books for slot '{}' are held in memory only", self.key);
                }
            }
            Err(e) => {
                self.books.clear();
                self.record(e);
            }
        }
        self.loading = false;
    }

    /// Discard the in-memory collection and read the slot again
    ///
    /// An empty slot yields an empty collection; examples are never seeded.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        self.loading = true;
        let result = self.read_slot();
        self.loading = false;
        match result {
            Ok(books) => {
                self.books = books.unwrap_or_default();
                self.error = None;
                Ok(())
            }
            Err(e) => {
                self.books.clear();
                Err(self.record(e))
            }
        }
    }

    fn read_slot(&self) -> Result<Option<Vec<Book>>, StoreError> {
        let payload = match self.slots.get_item(&self.key) {
            Ok(Some(payload)) => payload,
            Ok(None) => return Ok(None),
            Err(e) => {
                return Err(StoreError::LoadFailure {
                    details: e.to_string(),
                })
            }
        };

        let books = codec::decode_books(&payload).map_err(|e| StoreError::LoadFailure {
            details: e.to_string(),
        })?;
        warn_on_duplicate_ids(&books);
        debug!("Loaded {} book(s) from slot '{}'", books.len(), self.key);
        Ok(Some(books))
    }

    /// Rewrite the whole collection to the slot
    fn persist(&mut self) -> Result<(), StoreError> {
        let result = codec::encode_books(&self.books)
            .map_err(StorageError::from)
            .and_then(|payload| self.slots.set_item(&self.key, &payload));

        match result {
            Ok(()) => {
                debug!("Persisted {} book(s) to slot '{}'", self.books.len(), self.key);
                Ok(())
            }
            Err(e) => Err(self.record(StoreError::PersistFailure(e))),
        }
    }

    /// Remember an error as the current error state and hand it back
    fn record(&mut self, error: StoreError) -> StoreError {
        warn!("{}", error);
        self.error = Some(error.to_string());
        error
    }

    // ==================== Mutations ====================

    /// Add a book with a fresh id
    pub fn add(&mut self, data: NewBook) -> Result<Book, StoreError> {
        validation::validate_new_book(&data)
            .into_result()
            .map_err(StoreError::ValidationFailure)?;

        let book = Book::new(data);
        self.books.push(book.clone());
        self.persist()?;
        self.error = None;
        debug!("Added book {}", book.id);
        Ok(book)
    }

    /// Merge `patch` over the book with `id`
    ///
    /// The record keeps its position, id and creation time; `updated_at`
    /// moves forward. An unknown id leaves the collection untouched.
    /// Patch values are merged as given: callers validate user input first
    /// (see [`BookForm::to_patch`](crate::models::BookForm::to_patch)).
    pub fn update(&mut self, id: &str, patch: BookPatch) -> Result<Book, StoreError> {
        let Some(index) = self.position(id) else {
            return Err(self.record(StoreError::NotFound { id: id.to_string() }));
        };

        self.books[index].apply(patch);
        let updated = self.books[index].clone();
        self.persist()?;
        self.error = None;
        debug!("Updated book {}", id);
        Ok(updated)
    }

    /// Remove every book with `id`, returning the first one removed
    ///
    /// Removing an unknown id is not an error. The collection is persisted
    /// either way.
    pub fn remove(&mut self, id: &str) -> Result<Option<Book>, StoreError> {
        let mut removed = None;
        self.books.retain(|book| {
            if book.id != id {
                return true;
            }
            removed.get_or_insert_with(|| book.clone());
            false
        });
        self.persist()?;
        self.error = None;
        if removed.is_some() {
            debug!("Removed book {}", id);
        }
        Ok(removed)
    }

    // ==================== Queries ====================

    /// Get a book by id
    pub fn find_by_id(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    /// All books whose id starts with `prefix`, in collection order
    pub fn find_by_id_prefix(&self, prefix: &str) -> Vec<&Book> {
        self.books
            .iter()
            .filter(|book| book.id.starts_with(prefix))
            .collect()
    }

    /// Books whose title, author or genre contains `query`, ignoring case
    ///
    /// A blank query returns the whole collection. Order is preserved.
    pub fn search(&self, query: &str) -> Vec<&Book> {
        if query.trim().is_empty() {
            return self.books.iter().collect();
        }
        self.books.iter().filter(|book| book.matches(query)).collect()
    }

    /// Distinct genres with the number of books in each, sorted by name
    pub fn genres_with_counts(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for genre in self.books.iter().filter_map(|book| book.genre.as_deref()) {
            *counts.entry(genre).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(genre, count)| (genre.to_string(), count))
            .collect()
    }

    // ==================== State ====================

    /// All books in collection order
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// True only while the slot is being read
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The current error message, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Dismiss the current error message
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Name of the slot this store persists to
    pub fn key(&self) -> &str {
        &self.key
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.books.iter().position(|book| book.id == id)
    }
}

fn warn_on_duplicate_ids(books: &[Book]) {
    let mut seen = HashSet::new();
    for book in books {
        if !seen.insert(book.id.as_str()) {
            warn!("Duplicate book id '{}' in stored collection", book.id);
        }
    }
}
