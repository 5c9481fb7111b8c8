//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use shelf_core::{Book, ValidationErrors};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a single book
    pub fn print_book(&self, book: &Book) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", book.id);
                println!("Title:       {}", book.title);
                println!("Author:      {}", book.author);
                println!("Year:        {}", book.year);
                if let Some(ref isbn) = book.isbn {
                    println!("ISBN:        {}", isbn);
                }
                if let Some(ref genre) = book.genre {
                    println!("Genre:       {}", genre);
                }
                if let Some(ref url) = book.cover_image_url {
                    println!("Cover:       {}", url);
                }
                println!("Created:     {}", book.created_at.format("%Y-%m-%d %H:%M"));
                println!("Updated:     {}", book.updated_at.format("%Y-%m-%d %H:%M"));

                if let Some(ref desc) = book.description {
                    println!();
                    println!("── Description ──");
                    println!("{}", desc);
                }
            }
            OutputFormat::Json => print_json(book),
            OutputFormat::Quiet => {
                println!("{}", book.id);
            }
        }
    }

    /// Print a list of books
    pub fn print_books(&self, books: &[&Book]) {
        match self.format {
            OutputFormat::Human => {
                if books.is_empty() {
                    println!("No books found.");
                    return;
                }
                for book in books {
                    let genre = book
                        .genre
                        .as_deref()
                        .map(|g| format!(" [{}]", truncate(g, 20)))
                        .unwrap_or_default();
                    println!(
                        "{:<8} | {:<35} | {:<25} | {}{}",
                        book.short_id(),
                        truncate(&book.title, 35),
                        truncate(&book.author, 25),
                        book.year,
                        genre
                    );
                }
                println!("\n{} book(s)", books.len());
            }
            OutputFormat::Json => print_json(&books),
            OutputFormat::Quiet => {
                for book in books {
                    println!("{}", book.id);
                }
            }
        }
    }

    /// Print genres with their book counts
    pub fn print_genres(&self, genres: &[(String, usize)]) {
        match self.format {
            OutputFormat::Human => {
                if genres.is_empty() {
                    println!("No genres found.");
                    return;
                }
                for (name, count) in genres {
                    println!("{} ({})", name, count);
                }
                println!("\n{} genre(s)", genres.len());
            }
            OutputFormat::Json => {
                let json_genres: Vec<_> = genres
                    .iter()
                    .map(|(name, count)| serde_json::json!({"name": name, "count": count}))
                    .collect();
                print_json(&json_genres);
            }
            OutputFormat::Quiet => {
                for (name, _) in genres {
                    println!("{}", name);
                }
            }
        }
    }

    /// Report field-level validation errors
    ///
    /// Human output goes to stderr; JSON output goes to stdout so scripts
    /// can read the field map.
    pub fn print_validation_errors(&self, errors: &ValidationErrors) {
        match self.format {
            OutputFormat::Human => {
                eprintln!("Invalid book:");
                for (field, message) in errors.iter() {
                    eprintln!("  {:<14} {}", field.as_str(), message);
                }
            }
            OutputFormat::Json => {
                print_json(&serde_json::json!({"status": "error", "errors": errors}));
            }
            OutputFormat::Quiet => {
                for (field, message) in errors.iter() {
                    eprintln!("{}: {}", field, message);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a warning to stderr (suppressed in quiet mode)
    pub fn warning(&self, message: &str) {
        if !self.is_quiet() {
            eprintln!("⚠ {}", message);
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode JSON output: {}", e),
    }
}

/// Truncate a string to max characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("Él niño über alles", 8), "Él ni...");
        assert_eq!(truncate("ÅÄÖ", 3), "ÅÄÖ");
    }

    #[test]
    fn test_should_prompt_only_for_humans() {
        assert!(Output::new(OutputFormat::Human).should_prompt());
        assert!(!Output::new(OutputFormat::Json).should_prompt());
        assert!(!Output::new(OutputFormat::Quiet).should_prompt());
    }
}
