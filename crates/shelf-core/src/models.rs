//! Data models for Shelf
//!
//! Defines the book record and the shapes used to create and change it:
//! - `NewBook`: validated values for a record that does not exist yet
//! - `BookPatch`: a partial update merged over an existing record
//! - `BookForm`: raw text exactly as the user typed it
//!
//! Records serialize with camelCase keys so the persisted slot keeps the
//! layout `[{"id", "title", "author", "year", "coverImageUrl", "createdAt", ...}]`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{self, Field, ValidationErrors, INVALID_URL_MESSAGE};

/// A book in the library
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Opaque unique identifier
    pub id: String,
    pub title: String,
    pub author: String,
    /// Publication year
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Absolute URL of a cover image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    /// When this record was created
    pub created_at: DateTime<Utc>,
    /// When this record was last changed
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Create a record with a fresh identifier, stamped now
    pub fn new(data: NewBook) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), data, Utc::now())
    }

    /// Create a record with a specific identifier and creation time
    pub fn with_id(id: impl Into<String>, data: NewBook, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: data.title,
            author: data.author,
            year: data.year,
            isbn: data.isbn,
            genre: data.genre,
            description: data.description,
            cover_image_url: data.cover_image_url,
            created_at,
            updated_at: created_at,
        }
    }

    /// Merge a patch over this record and refresh `updated_at`
    ///
    /// Identity and creation time are never touched.
    pub fn apply(&mut self, patch: BookPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(author) = patch.author {
            self.author = author;
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
        if let Some(isbn) = patch.isbn {
            self.isbn = isbn;
        }
        if let Some(genre) = patch.genre {
            self.genre = genre;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(cover_image_url) = patch.cover_image_url {
            self.cover_image_url = cover_image_url;
        }
        self.touch();
    }

    /// Move `updated_at` strictly forward
    pub fn touch(&mut self) {
        self.updated_at = next_timestamp(self.updated_at);
    }

    /// Case-insensitive match of `query` against title, author and genre
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query)
            || self.author.to_lowercase().contains(&query)
            || self
                .genre
                .as_deref()
                .is_some_and(|genre| genre.to_lowercase().contains(&query))
    }

    /// The field values of this record, without identity or timestamps
    pub fn to_new_book(&self) -> NewBook {
        NewBook {
            title: self.title.clone(),
            author: self.author.clone(),
            year: self.year,
            isbn: self.isbn.clone(),
            genre: self.genre.clone(),
            description: self.description.clone(),
            cover_image_url: self.cover_image_url.clone(),
        }
    }

    /// First eight characters of the id, for listings
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(8) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }
}

/// Field values for a book that is about to be added
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub year: i32,
    pub isbn: Option<String>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
}

impl NewBook {
    pub fn new(title: impl Into<String>, author: impl Into<String>, year: i32) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year,
            ..Self::default()
        }
    }

    pub fn isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn cover_image_url(mut self, url: impl Into<String>) -> Self {
        self.cover_image_url = Some(url.into());
        self
    }
}

/// A partial update
///
/// `None` keeps the current value. For the optional fields `Some(None)`
/// clears the value and `Some(Some(v))` replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<i32>,
    pub isbn: Option<Option<String>>,
    pub genre: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub cover_image_url: Option<Option<String>>,
}

impl BookPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn isbn(mut self, isbn: Option<String>) -> Self {
        self.isbn = Some(isbn);
        self
    }

    pub fn genre(mut self, genre: Option<String>) -> Self {
        self.genre = Some(genre);
        self
    }

    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    pub fn cover_image_url(mut self, url: Option<String>) -> Self {
        self.cover_image_url = Some(url);
        self
    }

    /// True when the patch would change no field
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Raw form input, as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub year: String,
    pub isbn: String,
    pub genre: String,
    pub description: String,
    pub cover_image_url: String,
}

impl BookForm {
    /// Pre-fill a form from an existing record (edit flow)
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            year: book.year.to_string(),
            isbn: book.isbn.clone().unwrap_or_default(),
            genre: book.genre.clone().unwrap_or_default(),
            description: book.description.clone().unwrap_or_default(),
            cover_image_url: book.cover_image_url.clone().unwrap_or_default(),
        }
    }

    /// All field errors for this form, including the cover image URL
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = validation::validate_book_form(self);
        if !validation::is_valid_url(&self.cover_image_url) {
            errors.insert(Field::CoverImageUrl, INVALID_URL_MESSAGE);
        }
        errors
    }

    /// Validate and convert into values for a new record
    ///
    /// Text is trimmed and blank optional fields become `None`.
    pub fn to_new_book(&self) -> Result<NewBook, ValidationErrors> {
        self.validate().into_result()?;
        Ok(NewBook {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            year: self.parsed_year()?,
            isbn: non_blank(&self.isbn),
            genre: non_blank(&self.genre),
            description: non_blank(&self.description),
            cover_image_url: non_blank(&self.cover_image_url),
        })
    }

    /// Validate and convert into a patch that replaces every field
    ///
    /// Blank optional fields clear the stored value.
    pub fn to_patch(&self) -> Result<BookPatch, ValidationErrors> {
        let book = self.to_new_book()?;
        Ok(BookPatch {
            title: Some(book.title),
            author: Some(book.author),
            year: Some(book.year),
            isbn: Some(book.isbn),
            genre: Some(book.genre),
            description: Some(book.description),
            cover_image_url: Some(book.cover_image_url),
        })
    }

    fn parsed_year(&self) -> Result<i32, ValidationErrors> {
        self.year.trim().parse().map_err(|_| {
            let mut errors = ValidationErrors::new();
            errors.insert(Field::Year, "Year is required");
            errors
        })
    }
}

/// Trimmed value, or `None` when blank
pub fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Book {
        Book::new(
            NewBook::new("Graphic Design", "George Orwell", 1949)
                .genre("Dystopian Fiction")
                .isbn("978-0-452-28423-4"),
        )
    }

    #[test]
    fn test_book_new() {
        let book = sample();
        assert_eq!(book.title, "Graphic Design");
        assert_eq!(book.author, "George Orwell");
        assert_eq!(book.year, 1949);
        assert_eq!(book.created_at, book.updated_at);
        assert!(book.description.is_none());
        assert!(Uuid::parse_str(&book.id).is_ok());
    }

    #[test]
    fn test_book_ids_are_unique() {
        let a = sample();
        let b = sample();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_apply_changes_only_patched_fields() {
        let mut book = sample();
        let before = book.clone();

        book.apply(BookPatch::new().title("X"));

        assert_eq!(book.title, "X");
        assert_eq!(book.author, before.author);
        assert_eq!(book.year, before.year);
        assert_eq!(book.genre, before.genre);
        assert_eq!(book.isbn, before.isbn);
        assert_eq!(book.id, before.id);
        assert_eq!(book.created_at, before.created_at);
        assert!(book.updated_at > before.updated_at);
    }

    #[test]
    fn test_apply_clears_optional_field() {
        let mut book = sample();
        book.apply(BookPatch::new().genre(None));
        assert!(book.genre.is_none());
        assert_eq!(book.isbn.as_deref(), Some("978-0-452-28423-4"));
    }

    #[test]
    fn test_touch_is_strictly_increasing() {
        let mut book = sample();
        let mut last = book.updated_at;
        for _ in 0..5 {
            book.touch();
            assert!(book.updated_at > last);
            last = book.updated_at;
        }
        assert!(book.updated_at >= book.created_at);
    }

    #[test]
    fn test_matches_title_author_and_genre() {
        let book = sample();
        assert!(book.matches("graphic"));
        assert!(book.matches("ORWELL"));
        assert!(book.matches("fiction"));
        assert!(!book.matches("978"));
        assert!(!book.matches("harper"));
    }

    #[test]
    fn test_matches_without_genre() {
        let book = Book::new(NewBook::new("Dune", "Frank Herbert", 1965));
        assert!(!book.matches("fiction"));
        assert!(book.matches("dun"));
    }

    #[test]
    fn test_short_id() {
        let book = Book::with_id("1", NewBook::new("Dune", "Frank Herbert", 1965), Utc::now());
        assert_eq!(book.short_id(), "1");

        let book = sample();
        assert_eq!(book.short_id().len(), 8);
        assert!(book.id.starts_with(book.short_id()));
    }

    #[test]
    fn test_serialization_uses_camel_case_and_omits_absent_fields() {
        let book = sample();
        let json = serde_json::to_value(&book).unwrap();

        assert_eq!(json["year"], 1949);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("coverImageUrl").is_none());
        assert!(json.get("description").is_none());
        assert_eq!(json["genre"], "Dystopian Fiction");
    }

    #[test]
    fn test_deserialize_external_record() {
        let json = r#"{
            "id": "1",
            "title": "The Passion within",
            "author": "Harper Lee",
            "year": 1960,
            "coverImageUrl": "https://images.pexels.com/photos/256450/pexels-photo-256450.jpeg",
            "createdAt": "2024-05-01T10:00:00.000Z",
            "updatedAt": "2024-05-02T10:00:00.000Z"
        }"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.id, "1");
        assert!(book.genre.is_none());
        assert!(book.cover_image_url.is_some());
        assert!(book.updated_at > book.created_at);
    }

    #[test]
    fn test_form_to_new_book_trims_and_drops_blanks() {
        let form = BookForm {
            title: "  Dune ".to_string(),
            author: "Frank Herbert".to_string(),
            year: " 1965 ".to_string(),
            isbn: "   ".to_string(),
            genre: "Science Fiction".to_string(),
            description: String::new(),
            cover_image_url: String::new(),
        };

        let book = form.to_new_book().unwrap();
        assert_eq!(book.title, "Dune");
        assert_eq!(book.year, 1965);
        assert!(book.isbn.is_none());
        assert_eq!(book.genre.as_deref(), Some("Science Fiction"));
        assert!(book.cover_image_url.is_none());
    }

    #[test]
    fn test_form_rejects_bad_cover_url() {
        let form = BookForm {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            year: "1965".to_string(),
            cover_image_url: "cover.jpg".to_string(),
            ..BookForm::default()
        };

        let errors = form.to_new_book().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::CoverImageUrl), Some(INVALID_URL_MESSAGE));
    }

    #[test]
    fn test_form_round_trips_through_edit() {
        let book = sample();
        let form = BookForm::from_book(&book);
        assert_eq!(form.year, "1949");
        assert_eq!(form.description, "");

        let patch = form.to_patch().unwrap();
        assert_eq!(patch.title.as_deref(), Some("Graphic Design"));
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.genre, Some(Some("Dystopian Fiction".to_string())));
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(BookPatch::new().is_empty());
        assert!(!BookPatch::new().year(2000).is_empty());
    }
}
