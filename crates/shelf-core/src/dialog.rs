//! Dialog state
//!
//! At most one dialog is open at a time, and the edit, delete and view
//! dialogs always carry the record they act on.

use crate::models::Book;

/// Which dialog is open, and for which record
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DialogState {
    #[default]
    Closed,
    Adding,
    Editing(Book),
    Deleting(Book),
    Viewing(Book),
}

impl DialogState {
    pub fn open_add(&mut self) {
        *self = DialogState::Adding;
    }

    pub fn open_edit(&mut self, book: Book) {
        *self = DialogState::Editing(book);
    }

    pub fn open_delete(&mut self, book: Book) {
        *self = DialogState::Deleting(book);
    }

    pub fn open_view(&mut self, book: Book) {
        *self = DialogState::Viewing(book);
    }

    /// Close whatever is open, dropping the associated record
    pub fn close(&mut self) {
        *self = DialogState::Closed;
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, DialogState::Closed)
    }

    pub fn is_adding(&self) -> bool {
        matches!(self, DialogState::Adding)
    }

    /// The record being edited, if the edit dialog is open
    pub fn editing(&self) -> Option<&Book> {
        match self {
            DialogState::Editing(book) => Some(book),
            _ => None,
        }
    }

    /// The record pending deletion, if the delete dialog is open
    pub fn deleting(&self) -> Option<&Book> {
        match self {
            DialogState::Deleting(book) => Some(book),
            _ => None,
        }
    }

    /// The record shown in the detail dialog
    pub fn viewing(&self) -> Option<&Book> {
        match self {
            DialogState::Viewing(book) => Some(book),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewBook;

    fn book() -> Book {
        Book::new(NewBook::new("Dune", "Frank Herbert", 1965))
    }

    #[test]
    fn test_starts_closed() {
        let state = DialogState::default();
        assert!(!state.is_open());
        assert!(state.editing().is_none());
        assert!(state.deleting().is_none());
    }

    #[test]
    fn test_opening_replaces_previous_dialog() {
        let mut state = DialogState::default();
        let book = book();

        state.open_edit(book.clone());
        assert_eq!(state.editing(), Some(&book));

        state.open_delete(book.clone());
        assert!(state.editing().is_none());
        assert_eq!(state.deleting(), Some(&book));

        state.open_add();
        assert!(state.is_adding());
        assert!(state.deleting().is_none());
    }

    #[test]
    fn test_close_drops_record() {
        let mut state = DialogState::default();
        state.open_view(book());
        assert!(state.is_open());
        assert!(state.viewing().is_some());

        state.close();
        assert_eq!(state, DialogState::Closed);
        assert!(state.viewing().is_none());
    }
}
