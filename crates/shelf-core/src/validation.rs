//! Book field validation
//!
//! Pure checks over proposed field values. Each check yields the message for
//! the failing field; callers collect them into a [`ValidationErrors`] map.
//! An empty map means the input is valid.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Utc};
use serde::{Serialize, Serializer};
use url::Url;

use crate::models::{BookForm, NewBook};

/// Earliest accepted publication year
pub const MIN_YEAR: i32 = 1000;

/// How many years past the current one a publication year may be
pub const FUTURE_YEAR_ALLOWANCE: i32 = 10;

/// Minimum length (in characters) of title and author
pub const MIN_TEXT_LEN: usize = 2;

/// Message shown for a malformed cover image URL
pub const INVALID_URL_MESSAGE: &str = "Please enter a valid URL";

/// A validated form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Author,
    Year,
    CoverImageUrl,
}

impl Field {
    /// Field name as it appears in the persisted record
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Author => "author",
            Field::Year => "year",
            Field::CoverImageUrl => "coverImageUrl",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Field name → error message, for exactly the fields that failed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for a field, replacing any previous one
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Get the error message for a field
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over failing fields in a stable order
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    /// `Ok(())` when there are no errors
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    fn record(&mut self, field: Field, message: Option<String>) {
        if let Some(message) = message {
            self.insert(field, message);
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// The year used as "now" for range checks
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// Latest accepted publication year for the given current year
pub fn max_year(current_year: i32) -> i32 {
    current_year + FUTURE_YEAR_ALLOWANCE
}

/// Validate the mandatory fields of a raw form against today's date
pub fn validate_book_form(form: &BookForm) -> ValidationErrors {
    validate_book_form_for_year(form, current_year())
}

/// Validate the mandatory fields of a raw form
///
/// Only `title`, `author` and `year` are checked here; the cover image URL is
/// a separate check (see [`is_valid_url`]).
pub fn validate_book_form_for_year(form: &BookForm, current_year: i32) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.record(Field::Title, check_text(&form.title, "Title"));
    errors.record(Field::Author, check_text(&form.author, "Author"));

    let year = form.year.trim();
    if year.is_empty() {
        errors.insert(Field::Year, "Year is required");
    } else {
        match year.parse::<i32>() {
            Ok(value) => errors.record(Field::Year, check_year(value, current_year)),
            Err(_) => errors.insert(Field::Year, year_range_message(current_year)),
        }
    }

    errors
}

/// Validate already-typed values before they reach the store
pub fn validate_new_book(book: &NewBook) -> ValidationErrors {
    validate_new_book_for_year(book, current_year())
}

pub fn validate_new_book_for_year(book: &NewBook, current_year: i32) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.record(Field::Title, check_text(&book.title, "Title"));
    errors.record(Field::Author, check_text(&book.author, "Author"));
    errors.record(Field::Year, check_year(book.year, current_year));
    if let Some(url) = &book.cover_image_url {
        if !is_valid_url(url) {
            errors.insert(Field::CoverImageUrl, INVALID_URL_MESSAGE);
        }
    }
    errors
}

/// Check a cover image URL
///
/// Blank input is valid since the field is optional. Anything else must parse
/// as an absolute URL.
pub fn is_valid_url(url: &str) -> bool {
    if url.trim().is_empty() {
        return true;
    }
    Url::parse(url).is_ok()
}

fn check_text(value: &str, label: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Some(format!("{} is required", label))
    } else if trimmed.chars().count() < MIN_TEXT_LEN {
        Some(format!(
            "{} must be at least {} characters long",
            label, MIN_TEXT_LEN
        ))
    } else {
        None
    }
}

fn check_year(year: i32, current_year: i32) -> Option<String> {
    if (MIN_YEAR..=max_year(current_year)).contains(&year) {
        None
    } else {
        Some(year_range_message(current_year))
    }
}

fn year_range_message(current_year: i32) -> String {
    format!(
        "Year must be between {} and {}",
        MIN_YEAR,
        max_year(current_year)
    )
}
