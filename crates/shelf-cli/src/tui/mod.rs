//! Shelf TUI
//!
//! Terminal user interface for the book library.
//!
//! ## Layout
//!
//! Two-pane layout:
//! - Left: Book list (filtered by the search query)
//! - Right: Detail preview of the selected book
//!
//! An error banner appears above the panes while the store reports an error.
//!
//! ## Navigation
//!
//! - j/k or ↑/↓: Move selection up/down
//! - g/G: Jump to first/last book
//! - Enter: View book details
//! - q: Quit
//!
//! ## Commands
//!
//! - a: Add book
//! - e: Edit book
//! - d: Delete book
//! - /: Search by title, author or genre
//! - r: Reload from storage
//! - x: Dismiss error banner

mod app;
mod ui;

use std::fs::{self, File};
use std::io::{self, stdout};
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use shelf_core::{BookStore, Config, DialogState};
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::{App, InputMode};

/// Run the TUI application
pub fn run(config: &Config) -> Result<()> {
    // Initialize TUI logging (file-based, only if SHELF_LOG is set)
    init_tui_logging(config);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_with_terminal(&mut terminal, config);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_with_terminal<B: Backend>(terminal: &mut Terminal<B>, config: &Config) -> Result<()> {
    // Show a loading screen while the collection is read
    terminal.draw(ui::draw_loading)?;
    let mut store = BookStore::open_with_config(config);
    info!("Opened library with {} book(s)", store.len());

    let mut app = App::new(&store);
    run_app(terminal, &mut app, &mut store)
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, store: &mut BookStore) -> Result<()> {
    loop {
        // Check for status message timeout
        app.check_status_timeout();

        // Draw UI
        terminal.draw(|frame| ui::draw(frame, app, store))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    handle_key(app, store, key.code, key.modifiers);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Route a key press to the handler for the current dialog or mode
fn handle_key(app: &mut App, store: &mut BookStore, code: KeyCode, modifiers: KeyModifiers) {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // If help is showing, any key dismisses it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match app.dialog {
        DialogState::Adding | DialogState::Editing(_) => handle_form(app, store, code),
        DialogState::Deleting(_) => handle_delete_confirm(app, store, code),
        DialogState::Viewing(_) => handle_view(app, code),
        DialogState::Closed => match app.input_mode {
            InputMode::Normal => handle_normal_mode(app, store, code),
            InputMode::Search => handle_search_mode(app, store, code),
        },
    }
}

/// Handle key events in normal mode
fn handle_normal_mode(app: &mut App, store: &mut BookStore, code: KeyCode) {
    match code {
        // Quit
        KeyCode::Char('q') => {
            app.should_quit = true;
        }

        // Navigation
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('g') | KeyCode::Home => app.move_to_first(),
        KeyCode::Char('G') | KeyCode::End => app.move_to_last(),

        // Dialogs
        KeyCode::Enter => app.open_view(),
        KeyCode::Char('a') => app.open_add(),
        KeyCode::Char('e') => app.open_edit(),
        KeyCode::Char('d') => app.open_delete(),

        // Search
        KeyCode::Char('/') => app.enter_search_mode(),
        KeyCode::Esc => app.clear_search(store),

        KeyCode::Char('r') => app.reload(store),
        KeyCode::Char('x') => store.clear_error(),
        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
}

/// Handle key events in search mode
fn handle_search_mode(app: &mut App, store: &BookStore, code: KeyCode) {
    match code {
        // Cancel search
        KeyCode::Esc => app.clear_search(store),

        // Confirm search (stay in filtered view)
        KeyCode::Enter => app.exit_search_mode(),

        // Text input
        KeyCode::Char(c) => app.search_insert_char(store, c),
        KeyCode::Backspace => app.search_delete_char(store),

        _ => {}
    }
}

/// Handle key events in the add/edit form
fn handle_form(app: &mut App, store: &mut BookStore, code: KeyCode) {
    match code {
        KeyCode::Esc => app.close_dialog(),
        KeyCode::Enter => app.submit_form(store),
        KeyCode::Tab | KeyCode::Down => app.form.next_field(),
        KeyCode::BackTab | KeyCode::Up => app.form.prev_field(),
        KeyCode::Char(c) => app.form.insert_char(c),
        KeyCode::Backspace => app.form.delete_char(),
        _ => {}
    }
}

/// Handle key events in the delete confirmation
fn handle_delete_confirm(app: &mut App, store: &mut BookStore, code: KeyCode) {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_delete(store),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.close_dialog(),
        _ => {}
    }
}

/// Handle key events in the detail dialog
fn handle_view(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => app.close_dialog(),
        KeyCode::Char('e') => app.open_edit(),
        KeyCode::Char('d') => app.open_delete(),
        _ => {}
    }
}

/// Initialize logging for TUI mode
///
/// Only initializes if SHELF_LOG environment variable is set.
/// Logs to file (config.log_file or default {data_dir}/debug.log).
fn init_tui_logging(config: &Config) {
    // Only log if SHELF_LOG is set
    let Ok(log_level) = std::env::var("SHELF_LOG") else {
        return;
    };

    let log_path = config.log_path();

    let log_file = match create_log_file(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!("shelf_core={},shelf={}", log_level, log_level));

    // Initialize file-based logging (ignore error if already initialized)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("TUI logging initialized to {:?}", log_path);
}

/// Create (or truncate) the log file, creating its directory first
fn create_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::{InMemorySlotStore, StoreOptions};
    use std::sync::Arc;

    fn setup() -> (App, BookStore) {
        let store = BookStore::open(
            Arc::new(InMemorySlotStore::new()),
            "library-books",
            StoreOptions::default(),
        );
        (App::new(&store), store)
    }

    fn press(app: &mut App, store: &mut BookStore, code: KeyCode) {
        handle_key(app, store, code, KeyModifiers::NONE);
    }

    fn type_keys(app: &mut App, store: &mut BookStore, text: &str) {
        for c in text.chars() {
            press(app, store, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_log_file_created_in_missing_data_dir() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().join("shelf"),
            ..Config::default()
        };
        let log_path = config.log_path();
        assert!(!config.data_dir.exists());

        create_log_file(&log_path).unwrap();
        assert!(log_path.exists());
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, mut store) = setup();
        press(&mut app, &mut store, KeyCode::Char('q'));
        assert!(app.should_quit);

        let (mut app, mut store) = setup();
        handle_key(&mut app, &mut store, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }

    #[test]
    fn test_typing_in_form_does_not_trigger_commands() {
        let (mut app, mut store) = setup();

        press(&mut app, &mut store, KeyCode::Char('a'));
        type_keys(&mut app, &mut store, "queued");
        assert!(!app.should_quit);
        assert_eq!(app.form.values.title, "queued");

        press(&mut app, &mut store, KeyCode::Esc);
        assert!(!app.dialog.is_open());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_add_with_keys() {
        let (mut app, mut store) = setup();

        press(&mut app, &mut store, KeyCode::Char('a'));
        type_keys(&mut app, &mut store, "Dune");
        press(&mut app, &mut store, KeyCode::Tab);
        type_keys(&mut app, &mut store, "Frank Herbert");
        press(&mut app, &mut store, KeyCode::Tab);
        type_keys(&mut app, &mut store, "1965");
        press(&mut app, &mut store, KeyCode::Enter);

        assert!(!app.dialog.is_open());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_search_mode_with_keys() {
        let (mut app, mut store) = setup();

        press(&mut app, &mut store, KeyCode::Char('/'));
        type_keys(&mut app, &mut store, "harper");
        assert_eq!(app.books.len(), 1);

        // Enter keeps the filter
        press(&mut app, &mut store, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.books.len(), 1);

        press(&mut app, &mut store, KeyCode::Esc);
        assert_eq!(app.books.len(), 2);
        assert!(app.search_query.is_empty());
    }

    #[test]
    fn test_delete_with_keys() {
        let (mut app, mut store) = setup();

        press(&mut app, &mut store, KeyCode::Char('d'));
        press(&mut app, &mut store, KeyCode::Char('n'));
        assert_eq!(store.len(), 2);

        press(&mut app, &mut store, KeyCode::Char('d'));
        press(&mut app, &mut store, KeyCode::Char('y'));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_view_then_edit() {
        let (mut app, mut store) = setup();

        press(&mut app, &mut store, KeyCode::Enter);
        assert!(app.dialog.viewing().is_some());

        press(&mut app, &mut store, KeyCode::Char('e'));
        assert_eq!(app.dialog.editing().unwrap().id, "1");
    }

    #[test]
    fn test_dismiss_error_banner() {
        let (mut app, mut store) = setup();
        let _ = store.update("missing", shelf_core::BookPatch::new().title("X"));
        assert!(store.error().is_some());

        press(&mut app, &mut store, KeyCode::Char('x'));
        assert!(store.error().is_none());
    }

    #[test]
    fn test_help_overlay_swallows_next_key() {
        let (mut app, mut store) = setup();

        press(&mut app, &mut store, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, &mut store, KeyCode::Char('q'));
        assert!(!app.show_help);
        assert!(!app.should_quit);
    }
}
