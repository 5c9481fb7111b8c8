//! Persisted collection format
//!
//! A slot holds a JSON array of book records. There is no version field;
//! records are read and written with the camelCase layout of [`Book`].

use crate::models::Book;

/// Serialize the whole collection
pub fn encode_books(books: &[Book]) -> serde_json::Result<String> {
    serde_json::to_string(books)
}

/// Parse a persisted collection
pub fn decode_books(payload: &str) -> serde_json::Result<Vec<Book>> {
    serde_json::from_str(payload)
}
