//! Book command handlers

use anyhow::{bail, Result};
use clap::Args;

use shelf_core::{Book, BookForm, BookStore, StoreError, ValidationErrors};

use crate::editor::{confirm, is_interactive, prompt_with_default};
use crate::output::Output;

/// Field values given as flags to `book add` and `book edit`
///
/// For `edit`, an empty string clears an optional field.
#[derive(Args, Debug, Default, Clone)]
pub struct BookFieldArgs {
    /// Book title
    #[arg(short = 't', long)]
    pub title: Option<String>,
    /// Author name
    #[arg(short = 'a', long)]
    pub author: Option<String>,
    /// Publication year
    #[arg(short = 'y', long)]
    pub year: Option<String>,
    /// ISBN
    #[arg(long)]
    pub isbn: Option<String>,
    /// Genre
    #[arg(short = 'g', long)]
    pub genre: Option<String>,
    /// Short description
    #[arg(short = 'd', long)]
    pub description: Option<String>,
    /// Absolute URL of a cover image
    #[arg(long = "cover-url", value_name = "URL")]
    pub cover_url: Option<String>,
}

impl BookFieldArgs {
    /// True when no field flag was given
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.year.is_none()
            && self.isbn.is_none()
            && self.genre.is_none()
            && self.description.is_none()
            && self.cover_url.is_none()
    }

    /// Overwrite the form fields that were given
    pub fn apply_to(self, form: &mut BookForm) {
        let fields = [
            (self.title, &mut form.title),
            (self.author, &mut form.author),
            (self.year, &mut form.year),
            (self.isbn, &mut form.isbn),
            (self.genre, &mut form.genre),
            (self.description, &mut form.description),
            (self.cover_url, &mut form.cover_image_url),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

/// Add a new book
pub fn add(store: &mut BookStore, fields: BookFieldArgs, output: &Output) -> Result<()> {
    let mut form = BookForm::default();
    fields.apply_to(&mut form);

    let data = match form.to_new_book() {
        Ok(data) => data,
        Err(errors) => return invalid(&errors, output),
    };

    let book = match store.add(data) {
        Ok(book) => book,
        Err(StoreError::ValidationFailure(errors)) => return invalid(&errors, output),
        Err(e) => return Err(e.into()),
    };

    output.success(&format!("Added book: {}", book.id));
    output.print_book(&book);

    Ok(())
}

/// List all books
pub fn list(store: &BookStore, output: &Output) -> Result<()> {
    let books: Vec<&Book> = store.books().iter().collect();
    output.print_books(&books);
    Ok(())
}

/// Show a single book
pub fn show(store: &BookStore, id: &str, output: &Output) -> Result<()> {
    let book = resolve_book(store, id)?;
    output.print_book(book);
    Ok(())
}

/// Edit a book
///
/// Flags replace the given fields. With no flags and an interactive
/// terminal, each field is prompted for with the current value as default.
pub fn edit(store: &mut BookStore, id: &str, fields: BookFieldArgs, output: &Output) -> Result<()> {
    let book = resolve_book(store, id)?.clone();
    let mut form = BookForm::from_book(&book);

    if fields.is_empty() {
        if !is_interactive() {
            bail!("No fields given. Pass field flags (e.g. --title) or run in a terminal.");
        }
        prompt_for_fields(&book, &mut form)?;
    } else {
        fields.apply_to(&mut form);
    }

    if form == BookForm::from_book(&book) {
        output.message("No changes.");
        return Ok(());
    }

    let patch = match form.to_patch() {
        Ok(patch) => patch,
        Err(errors) => return invalid(&errors, output),
    };

    let updated = store.update(&book.id, patch)?;

    output.success("Book updated");
    output.print_book(&updated);

    Ok(())
}

/// Delete a book
pub fn delete(store: &mut BookStore, id: &str, yes: bool, output: &Output) -> Result<()> {
    let book = resolve_book(store, id)?.clone();

    // Confirm deletion
    if !yes && output.should_prompt() {
        println!("Delete book: {} - {}", book.short_id(), book.title);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.remove(&book.id)?;

    output.success(&format!("Deleted book: {}", book.id));

    Ok(())
}

/// Search books
pub fn search(store: &BookStore, query: &str, output: &Output) -> Result<()> {
    let books = store.search(query);
    output.print_books(&books);
    Ok(())
}

fn prompt_for_fields(book: &Book, form: &mut BookForm) -> Result<()> {
    println!("Editing book: {}", book.id);
    println!("Press Enter to keep current value, '-' to clear, or type new value.\n");

    let fields = [
        ("Title", &mut form.title),
        ("Author", &mut form.author),
        ("Year", &mut form.year),
        ("ISBN", &mut form.isbn),
        ("Genre", &mut form.genre),
        ("Description", &mut form.description),
        ("Cover image URL", &mut form.cover_image_url),
    ];
    for (label, value) in fields {
        if let Some(answer) = prompt_with_default(label, value)? {
            *value = answer;
        }
    }
    Ok(())
}

fn invalid(errors: &ValidationErrors, output: &Output) -> Result<()> {
    output.print_validation_errors(errors);
    bail!("Book not saved: {} invalid field(s)", errors.len());
}

/// Find a book by full id or unique id prefix
fn resolve_book<'a>(store: &'a BookStore, id: &str) -> Result<&'a Book> {
    if let Some(book) = store.find_by_id(id) {
        return Ok(book);
    }

    let matches = store.find_by_id_prefix(id);
    match matches.as_slice() {
        [] => bail!("No book found matching: {}", id),
        [book] => Ok(*book),
        _ => {
            eprintln!("Multiple books match '{}':", id);
            for book in &matches {
                eprintln!("  {} - {}", book.id, book.title);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use shelf_core::{InMemorySlotStore, NewBook, StoreOptions};
    use std::sync::Arc;

    fn store() -> BookStore {
        BookStore::open(
            Arc::new(InMemorySlotStore::new()),
            "library-books",
            StoreOptions::default(),
        )
    }

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet)
    }

    fn fields(title: &str, author: &str, year: &str) -> BookFieldArgs {
        BookFieldArgs {
            title: Some(title.to_string()),
            author: Some(author.to_string()),
            year: Some(year.to_string()),
            ..BookFieldArgs::default()
        }
    }

    #[test]
    fn test_apply_to_only_overwrites_given_fields() {
        let mut form = BookForm {
            title: "Dune".to_string(),
            genre: "Science Fiction".to_string(),
            ..BookForm::default()
        };
        BookFieldArgs {
            genre: Some(String::new()),
            year: Some("1965".to_string()),
            ..BookFieldArgs::default()
        }
        .apply_to(&mut form);

        assert_eq!(form.title, "Dune");
        assert_eq!(form.year, "1965");
        assert_eq!(form.genre, "");
    }

    #[test]
    fn test_add_valid_book() {
        let mut store = store();
        add(&mut store, fields("Dune", "Frank Herbert", "1965"), &quiet()).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.books()[2].title, "Dune");
    }

    #[test]
    fn test_add_missing_fields_fails_without_change() {
        let mut store = store();
        let result = add(&mut store, BookFieldArgs::default(), &quiet());
        assert!(result.is_err());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_add_bad_year_fails() {
        let mut store = store();
        assert!(add(&mut store, fields("Ok", "Bo", "500"), &quiet()).is_err());
        assert!(add(&mut store, fields("Ok", "Bo", "soon"), &quiet()).is_err());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_edit_with_flags_clears_optional_field() {
        let mut store = store();
        let args = BookFieldArgs {
            title: Some("To Kill a Mockingbird".to_string()),
            cover_url: Some(String::new()),
            ..BookFieldArgs::default()
        };
        edit(&mut store, "1", args, &quiet()).unwrap();

        let book = store.find_by_id("1").unwrap();
        assert_eq!(book.title, "To Kill a Mockingbird");
        assert!(book.cover_image_url.is_none());
        assert_eq!(book.author, "Harper Lee");
    }

    #[test]
    fn test_edit_rejects_invalid_value() {
        let mut store = store();
        let args = BookFieldArgs {
            cover_url: Some("not a url".to_string()),
            ..BookFieldArgs::default()
        };
        assert!(edit(&mut store, "1", args, &quiet()).is_err());
        assert!(store.find_by_id("1").unwrap().cover_image_url.is_some());
    }

    #[test]
    fn test_delete_with_yes() {
        let mut store = store();
        delete(&mut store, "2", true, &quiet()).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.find_by_id("2").is_none());
    }

    #[test]
    fn test_delete_unknown_id_fails() {
        let mut store = store();
        assert!(delete(&mut store, "nope", true, &quiet()).is_err());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_resolve_book_by_exact_id_and_prefix() {
        let mut store = store();
        let book = store.add(NewBook::new("Dune", "Frank Herbert", 1965)).unwrap();

        assert_eq!(resolve_book(&store, "1").unwrap().id, "1");
        assert_eq!(resolve_book(&store, &book.id).unwrap().id, book.id);
        assert_eq!(resolve_book(&store, book.short_id()).unwrap().id, book.id);
        assert!(resolve_book(&store, "xyz-not-there").is_err());
    }

    #[test]
    fn test_resolve_book_ambiguous_prefix() {
        let mut store = store();
        store.remove("1").unwrap();
        store.remove("2").unwrap();
        for _ in 0..40 {
            store.add(NewBook::new("Dune", "Frank Herbert", 1965)).unwrap();
        }

        // With 40 random ids some hex digit must start at least three of them
        let ambiguous = "0123456789abcdef"
            .chars()
            .map(|c| c.to_string())
            .find(|prefix| store.find_by_id_prefix(prefix).len() > 1)
            .unwrap();
        assert!(resolve_book(&store, &ambiguous).is_err());
    }
}
