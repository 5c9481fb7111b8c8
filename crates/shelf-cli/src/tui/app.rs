//! Application state and logic

use std::time::{Duration, Instant};

use shelf_core::{Book, BookForm, BookStore, DialogState, Field, StoreError, ValidationErrors};

/// How long a status message stays visible
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Input mode for the list view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode
    Normal,
    /// Search mode (after pressing /)
    Search,
}

/// An editable field of the book form, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Author,
    Year,
    Isbn,
    Genre,
    Description,
    CoverImageUrl,
}

impl FormField {
    pub const ALL: [FormField; 7] = [
        FormField::Title,
        FormField::Author,
        FormField::Year,
        FormField::Isbn,
        FormField::Genre,
        FormField::Description,
        FormField::CoverImageUrl,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Author => "Author",
            FormField::Year => "Year",
            FormField::Isbn => "ISBN",
            FormField::Genre => "Genre",
            FormField::Description => "Description",
            FormField::CoverImageUrl => "Cover URL",
        }
    }

    /// Required fields are marked in the form
    pub fn is_required(self) -> bool {
        matches!(self, FormField::Title | FormField::Author | FormField::Year)
    }

    /// The validated field this input reports errors under
    pub fn validated(self) -> Option<Field> {
        match self {
            FormField::Title => Some(Field::Title),
            FormField::Author => Some(Field::Author),
            FormField::Year => Some(Field::Year),
            FormField::CoverImageUrl => Some(Field::CoverImageUrl),
            FormField::Isbn | FormField::Genre | FormField::Description => None,
        }
    }

    /// Move to the next field (wrapping)
    pub fn next(self) -> Self {
        let index = self.index();
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// Move to the previous field (wrapping)
    pub fn prev(self) -> Self {
        let index = self.index();
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn value(self, form: &BookForm) -> &str {
        match self {
            FormField::Title => &form.title,
            FormField::Author => &form.author,
            FormField::Year => &form.year,
            FormField::Isbn => &form.isbn,
            FormField::Genre => &form.genre,
            FormField::Description => &form.description,
            FormField::CoverImageUrl => &form.cover_image_url,
        }
    }

    fn value_mut(self, form: &mut BookForm) -> &mut String {
        match self {
            FormField::Title => &mut form.title,
            FormField::Author => &mut form.author,
            FormField::Year => &mut form.year,
            FormField::Isbn => &mut form.isbn,
            FormField::Genre => &mut form.genre,
            FormField::Description => &mut form.description,
            FormField::CoverImageUrl => &mut form.cover_image_url,
        }
    }
}

/// The add/edit form being filled in
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub values: BookForm,
    pub focus: FormField,
    /// Errors from the last submit attempt
    pub errors: ValidationErrors,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            values: BookForm::default(),
            focus: FormField::Title,
            errors: ValidationErrors::new(),
        }
    }
}

impl FormState {
    pub fn from_book(book: &Book) -> Self {
        Self {
            values: BookForm::from_book(book),
            ..Self::default()
        }
    }

    /// Error message for a form input, if the last submit rejected it
    pub fn error_for(&self, field: FormField) -> Option<&str> {
        field.validated().and_then(|f| self.errors.get(f))
    }

    pub fn insert_char(&mut self, c: char) {
        self.focus.value_mut(&mut self.values).push(c);
    }

    pub fn delete_char(&mut self) {
        self.focus.value_mut(&mut self.values).pop();
    }

    pub fn next_field(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn prev_field(&mut self) {
        self.focus = self.focus.prev();
    }
}

/// Application state
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    /// Current input mode
    pub input_mode: InputMode,
    /// Live search query
    pub search_query: String,
    /// Books matching the search query, in collection order
    pub books: Vec<Book>,
    /// Currently selected book index
    pub selected: usize,
    /// Which dialog is open
    pub dialog: DialogState,
    /// Form contents while adding or editing
    pub form: FormState,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<Instant>,
    /// Whether help overlay is visible
    pub show_help: bool,
}

impl App {
    /// Create a new app with data from store
    pub fn new(store: &BookStore) -> Self {
        let mut app = Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            search_query: String::new(),
            books: Vec::new(),
            selected: 0,
            dialog: DialogState::default(),
            form: FormState::default(),
            status_message: None,
            status_message_time: None,
            show_help: false,
        };
        app.refresh(store);
        app
    }

    /// Rebuild the visible list from the store and the search query
    pub fn refresh(&mut self, store: &BookStore) {
        self.books = store
            .search(&self.search_query)
            .into_iter()
            .cloned()
            .collect();

        // Clamp selection to new list bounds (preserve position when possible)
        if self.books.is_empty() {
            self.selected = 0;
        } else {
            self.selected = self.selected.min(self.books.len() - 1);
        }
    }

    /// Select the book with `id` if it is visible
    fn select_id(&mut self, id: &str) {
        if let Some(index) = self.books.iter().position(|b| b.id == id) {
            self.selected = index;
        }
    }

    /// Set a status message (will auto-dismiss after 3 seconds)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Get the currently selected book
    pub fn current_book(&self) -> Option<&Book> {
        self.books.get(self.selected)
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected < self.books.len().saturating_sub(1) {
            self.selected += 1;
        }
    }

    pub fn move_to_first(&mut self) {
        self.selected = 0;
    }

    pub fn move_to_last(&mut self) {
        self.selected = self.books.len().saturating_sub(1);
    }

    // ==================== Search ====================

    /// Enter search mode, keeping the current query
    pub fn enter_search_mode(&mut self) {
        self.input_mode = InputMode::Search;
    }

    /// Leave search mode, keeping the filtered view
    pub fn exit_search_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Clear the query and show every book
    pub fn clear_search(&mut self, store: &BookStore) {
        self.search_query.clear();
        self.input_mode = InputMode::Normal;
        self.refresh(store);
    }

    pub fn search_insert_char(&mut self, store: &BookStore, c: char) {
        self.search_query.push(c);
        self.selected = 0;
        self.refresh(store);
    }

    pub fn search_delete_char(&mut self, store: &BookStore) {
        self.search_query.pop();
        self.refresh(store);
    }

    // ==================== Dialogs ====================

    pub fn open_add(&mut self) {
        self.form = FormState::default();
        self.dialog.open_add();
    }

    /// Open the edit form for the selected book
    pub fn open_edit(&mut self) {
        let Some(book) = self.current_book().cloned() else {
            self.set_status("No book selected");
            return;
        };
        self.form = FormState::from_book(&book);
        self.dialog.open_edit(book);
    }

    /// Ask for confirmation before deleting the selected book
    pub fn open_delete(&mut self) {
        match self.current_book().cloned() {
            Some(book) => self.dialog.open_delete(book),
            None => self.set_status("No book selected"),
        }
    }

    /// Show the selected book's details
    pub fn open_view(&mut self) {
        if let Some(book) = self.current_book().cloned() {
            self.dialog.open_view(book);
        }
    }

    pub fn close_dialog(&mut self) {
        self.dialog.close();
        self.form = FormState::default();
    }

    /// Validate the form and add or update the book
    ///
    /// Field errors keep the form open. Store errors close it; they are
    /// shown in the error banner.
    pub fn submit_form(&mut self, store: &mut BookStore) {
        let result = match &self.dialog {
            DialogState::Adding => match self.form.values.to_new_book() {
                Ok(data) => store.add(data),
                Err(errors) => Err(StoreError::ValidationFailure(errors)),
            },
            DialogState::Editing(book) => match self.form.values.to_patch() {
                Ok(patch) => store.update(&book.id, patch),
                Err(errors) => Err(StoreError::ValidationFailure(errors)),
            },
            _ => return,
        };
        let adding = self.dialog.is_adding();

        match result {
            Ok(book) => {
                self.close_dialog();
                self.refresh(store);
                self.select_id(&book.id);
                let verb = if adding { "Added" } else { "Updated" };
                self.set_status(format!("{} '{}'", verb, book.title));
            }
            Err(StoreError::ValidationFailure(errors)) => {
                if let Some(field) = FormField::ALL
                    .into_iter()
                    .find(|f| f.validated().is_some_and(|v| errors.contains(v)))
                {
                    self.form.focus = field;
                }
                self.form.errors = errors;
            }
            Err(_) => {
                // Recorded by the store and shown in the banner
                self.close_dialog();
                self.refresh(store);
            }
        }
    }

    /// Delete the book in the confirmation dialog
    pub fn confirm_delete(&mut self, store: &mut BookStore) {
        let Some(book) = self.dialog.deleting().cloned() else {
            return;
        };
        self.close_dialog();

        let result = store.remove(&book.id);
        self.refresh(store);
        if result.is_ok() {
            self.set_status(format!("Deleted '{}'", book.title));
        }
    }

    /// Re-read the collection from storage
    pub fn reload(&mut self, store: &mut BookStore) {
        if store.reload().is_ok() {
            self.set_status(format!("Reloaded {} book(s)", store.len()));
        }
        self.refresh(store);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::{InMemorySlotStore, StoreOptions};
    use std::sync::Arc;

    fn store() -> BookStore {
        BookStore::open(
            Arc::new(InMemorySlotStore::new()),
            "library-books",
            StoreOptions::default(),
        )
    }

    fn type_text(form: &mut FormState, text: &str) {
        for c in text.chars() {
            form.insert_char(c);
        }
    }

    #[test]
    fn test_form_field_cycle() {
        assert_eq!(FormField::Title.next(), FormField::Author);
        assert_eq!(FormField::CoverImageUrl.next(), FormField::Title);
        assert_eq!(FormField::Title.prev(), FormField::CoverImageUrl);
        assert_eq!(FormField::Year.prev(), FormField::Author);
    }

    #[test]
    fn test_new_app_lists_all_books() {
        let store = store();
        let app = App::new(&store);
        assert_eq!(app.books.len(), 2);
        assert_eq!(app.current_book().unwrap().id, "1");
        assert_eq!(app.dialog, DialogState::Closed);
    }

    #[test]
    fn test_navigation_is_clamped() {
        let store = store();
        let mut app = App::new(&store);

        app.move_up();
        assert_eq!(app.selected, 0);
        app.move_down();
        app.move_down();
        assert_eq!(app.selected, 1);
        app.move_to_first();
        assert_eq!(app.selected, 0);
        app.move_to_last();
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn test_live_search() {
        let store = store();
        let mut app = App::new(&store);

        app.enter_search_mode();
        for c in "orwell".chars() {
            app.search_insert_char(&store, c);
        }
        assert_eq!(app.books.len(), 1);
        assert_eq!(app.books[0].id, "2");

        app.search_insert_char(&store, 'z');
        assert!(app.books.is_empty());
        assert!(app.current_book().is_none());

        app.search_delete_char(&store);
        assert_eq!(app.books.len(), 1);

        app.clear_search(&store);
        assert_eq!(app.books.len(), 2);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_add_through_form() {
        let mut store = store();
        let mut app = App::new(&store);

        app.open_add();
        assert!(app.dialog.is_adding());
        type_text(&mut app.form, "Dune");
        app.form.next_field();
        type_text(&mut app.form, "Frank Herbert");
        app.form.next_field();
        type_text(&mut app.form, "1965");

        app.submit_form(&mut store);

        assert!(!app.dialog.is_open());
        assert_eq!(store.len(), 3);
        assert_eq!(app.current_book().unwrap().title, "Dune");
        assert_eq!(app.status_message.as_deref(), Some("Added 'Dune'"));
    }

    #[test]
    fn test_invalid_form_stays_open_with_errors() {
        let mut store = store();
        let mut app = App::new(&store);

        app.open_add();
        app.form.focus = FormField::Author;
        type_text(&mut app.form, "Al");
        app.form.focus = FormField::Year;
        type_text(&mut app.form, "2000");

        app.submit_form(&mut store);

        assert!(app.dialog.is_adding());
        assert_eq!(app.form.errors.len(), 1);
        assert_eq!(app.form.error_for(FormField::Title), Some("Title is required"));
        assert_eq!(app.form.focus, FormField::Title);
        assert_eq!(store.len(), 2);
        assert!(store.error().is_none());
    }

    #[test]
    fn test_edit_through_form() {
        let mut store = store();
        let mut app = App::new(&store);
        app.move_down();

        app.open_edit();
        assert_eq!(app.dialog.editing().unwrap().id, "2");
        assert_eq!(app.form.values.title, "Graphic Design");

        app.form.values.title.clear();
        type_text(&mut app.form, "1984");
        app.submit_form(&mut store);

        assert!(!app.dialog.is_open());
        assert_eq!(store.find_by_id("2").unwrap().title, "1984");
        assert_eq!(app.current_book().unwrap().title, "1984");
    }

    #[test]
    fn test_edit_of_vanished_book_shows_banner() {
        let mut store = store();
        let mut app = App::new(&store);

        app.open_edit();
        store.remove("1").unwrap();
        app.submit_form(&mut store);

        assert!(!app.dialog.is_open());
        assert_eq!(store.error(), Some("Book not found"));
        assert_eq!(app.books.len(), 1);
    }

    #[test]
    fn test_delete_flow() {
        let mut store = store();
        let mut app = App::new(&store);

        app.open_delete();
        assert_eq!(app.dialog.deleting().unwrap().id, "1");

        app.confirm_delete(&mut store);
        assert!(!app.dialog.is_open());
        assert_eq!(store.len(), 1);
        assert_eq!(app.books.len(), 1);
        assert_eq!(app.current_book().unwrap().id, "2");
    }

    #[test]
    fn test_dialogs_need_a_selection() {
        let mut store = store();
        store.remove("1").unwrap();
        store.remove("2").unwrap();
        let mut app = App::new(&store);

        app.open_edit();
        app.open_delete();
        app.open_view();
        assert!(!app.dialog.is_open());
        assert_eq!(app.status_message.as_deref(), Some("No book selected"));
    }

    #[test]
    fn test_view_dialog() {
        let store = store();
        let mut app = App::new(&store);

        app.open_view();
        assert_eq!(app.dialog.viewing().unwrap().title, "The Passion within");
        app.close_dialog();
        assert!(!app.dialog.is_open());
    }
}
