//! UI rendering

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use shelf_core::{Book, BookStore, DialogState};

use super::app::{App, FormField, InputMode};

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App, store: &BookStore) {
    let banner = store.error();

    // Error banner on top, status bar at the bottom
    let outer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(if banner.is_some() { 1 } else { 0 }),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    if let Some(message) = banner {
        draw_error_banner(frame, message, outer_chunks[0]);
    }

    let pane_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(outer_chunks[1]);

    draw_books_pane(frame, app, store, pane_chunks[0]);
    draw_detail_pane(frame, app, pane_chunks[1]);

    match app.input_mode {
        InputMode::Normal => draw_status_bar(frame, app, outer_chunks[2]),
        InputMode::Search => draw_search_input(frame, app, outer_chunks[2]),
    }

    match &app.dialog {
        DialogState::Closed => {}
        DialogState::Adding => draw_form_dialog(frame, app, " Add Book "),
        DialogState::Editing(_) => draw_form_dialog(frame, app, " Edit Book "),
        DialogState::Deleting(book) => draw_delete_dialog(frame, book),
        DialogState::Viewing(book) => draw_view_dialog(frame, book),
    }

    // Draw help overlay if visible
    if app.show_help {
        draw_help_overlay(frame);
    }
}

/// Screen shown while the collection is being read
pub fn draw_loading(frame: &mut Frame) {
    let area = frame.area();
    let y = area.height / 2;
    let paragraph = Paragraph::new("Loading books...")
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, Rect::new(area.x, area.y + y, area.width, 1));
}

fn draw_error_banner(frame: &mut Frame, message: &str, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            format!(" ✗ {} ", message),
            Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  x:dismiss", Style::default().add_modifier(Modifier::DIM)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw the book list (left)
fn draw_books_pane(frame: &mut Frame, app: &App, store: &BookStore, area: Rect) {
    let max_len = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = app
        .books
        .iter()
        .map(|book| {
            let title = Line::from(Span::raw(clip(&book.title, max_len)));
            let byline = format!("{} · {}", book.author, book.year);
            let byline = Line::from(Span::styled(
                clip(&byline, max_len),
                Style::default().add_modifier(Modifier::DIM),
            ));
            ListItem::new(vec![title, byline])
        })
        .collect();

    let title = if app.search_query.is_empty() {
        format!(" Books ({}) ", app.books.len())
    } else {
        format!(" Books ({} of {}) ", app.books.len(), store.len())
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    if items.is_empty() {
        let hint = if store.is_empty() {
            "No books yet. Press a to add one."
        } else {
            "No books match your search."
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(
            hint,
            Style::default().add_modifier(Modifier::DIM),
        )))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::REVERSED),
    );

    let mut state = ListState::default();
    state.select(Some(app.selected));

    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw the detail pane (right)
fn draw_detail_pane(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title(" Detail ").borders(Borders::ALL);

    let content = match app.current_book() {
        Some(book) => book_lines(book),
        None => vec![
            Line::from(""),
            Line::from(Span::styled(
                "Select a book to view details",
                Style::default().add_modifier(Modifier::DIM),
            )),
        ],
    };

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn book_lines(book: &Book) -> Vec<Line<'_>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let field = |label: &'static str, value: &str| -> Line<'static> {
        Line::from(vec![Span::styled(label, bold), Span::raw(value.to_string())])
    };
    let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    let mut lines = vec![
        field("Title:  ", &book.title),
        field("Author: ", &book.author),
        field("Year:   ", &book.year.to_string()),
        field("Genre:  ", &optional(&book.genre)),
        field("ISBN:   ", &optional(&book.isbn)),
        field("Cover:  ", &optional(&book.cover_image_url)),
        Line::from(""),
        field("Created: ", &book.created_at.format("%Y-%m-%d %H:%M").to_string()),
        field("Updated: ", &book.updated_at.format("%Y-%m-%d %H:%M").to_string()),
    ];

    if let Some(description) = &book.description {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "── Description ──",
            Style::default().add_modifier(Modifier::DIM),
        )));
        lines.push(Line::from(description.as_str()));
    }

    lines
}

/// Draw the status bar at the bottom
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let content = if let Some(msg) = &app.status_message {
        msg.clone()
    } else if !app.search_query.is_empty() {
        format!("search: {}  (Esc to clear)", app.search_query)
    } else {
        "a:add  e:edit  d:del  Enter:view  /:search  r:reload  ?:help  q:quit".to_string()
    };

    let paragraph = Paragraph::new(content).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Draw search input at the bottom
fn draw_search_input(frame: &mut Frame, app: &App, area: Rect) {
    let prefix = "/";

    let line = Line::from(vec![
        Span::styled(prefix, Style::default().fg(Color::Cyan)),
        Span::raw(app.search_query.as_str()),
        Span::styled(
            format!("  ({} matches)", app.books.len()),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);

    // Position cursor
    let cursor_x = area.x + (prefix.len() + app.search_query.chars().count()) as u16;
    frame.set_cursor_position((cursor_x, area.y));
}

/// Draw the add/edit form
fn draw_form_dialog(frame: &mut Frame, app: &App, title: &str) {
    let area = popup_area(frame.area(), 64, 2 * FormField::ALL.len() as u16 + 5);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    let mut cursor = None;
    for (row, field) in FormField::ALL.into_iter().enumerate() {
        let focused = app.form.focus == field;
        let marker = if field.is_required() { "*" } else { " " };
        let label = format!("{:>12}{} ", field.label(), marker);
        let label_style = if focused {
            Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan)
        } else {
            Style::default()
        };
        let value = field.value(&app.form.values);

        if focused {
            let x = inner.x + (label.chars().count() + value.chars().count()) as u16;
            cursor = Some((x.min(inner.right().saturating_sub(1)), inner.y + 2 * row as u16));
        }

        lines.push(Line::from(vec![
            Span::styled(label, label_style),
            Span::raw(value.to_string()),
        ]));
        lines.push(match app.form.error_for(field) {
            Some(message) => Line::from(Span::styled(
                format!("{:>14}{}", "", message),
                Style::default().fg(Color::Red),
            )),
            None => Line::from(""),
        });
    }
    lines.push(Line::from(Span::styled(
        "Tab/↑↓:field  Enter:save  Esc:cancel",
        Style::default().add_modifier(Modifier::DIM),
    )));

    frame.render_widget(Paragraph::new(lines), inner);

    if let Some(position) = cursor {
        frame.set_cursor_position(position);
    }
}

/// Draw the delete confirmation
fn draw_delete_dialog(frame: &mut Frame, book: &Book) {
    let area = popup_area(frame.area(), 50, 7);
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from("Delete this book?"),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} ({})", book.title, book.author),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "y:delete  n:cancel",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" Delete Book ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Draw the full details of one book
fn draw_view_dialog(frame: &mut Frame, book: &Book) {
    let area = popup_area(frame.area(), 70, 20);
    frame.render_widget(Clear, area);

    let mut lines = vec![Line::from(Span::styled(
        format!("ID: {}", book.id),
        Style::default().add_modifier(Modifier::DIM),
    ))];
    lines.extend(book_lines(book));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "e:edit  d:delete  Esc:close",
        Style::default().add_modifier(Modifier::DIM),
    )));

    let block = Block::default()
        .title(format!(" {} ", book.title))
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame) {
    let popup_area = popup_area(frame.area(), 50, 20);

    // Clear the popup area
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  j/k, ↑/↓    Move up/down"),
        Line::from("  g/G         Jump to first/last book"),
        Line::from("  Enter       View book"),
        Line::from(""),
        Line::from("Commands:"),
        Line::from("  a           Add book"),
        Line::from("  e           Edit book"),
        Line::from("  d           Delete book"),
        Line::from("  /           Search"),
        Line::from("  r           Reload from storage"),
        Line::from("  x           Dismiss error"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, popup_area);
}

/// Centered popup of at most `width` x `height`
fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height.saturating_sub(2));
    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    Rect::new(popup_x, popup_y, popup_width, popup_height)
}

/// Clip to `max_len` characters with a trailing ellipsis
fn clip(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_popup_area_is_centered_and_clamped() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = popup_area(area, 50, 20);
        assert_eq!(popup, Rect::new(25, 10, 50, 20));

        let small = Rect::new(0, 0, 20, 10);
        let popup = popup_area(small, 50, 20);
        assert_eq!(popup.width, 16);
        assert_eq!(popup.height, 8);
    }

    #[test]
    fn test_clip() {
        assert_eq!(clip("Dune", 10), "Dune");
        assert_eq!(clip("The Passion within", 8), "The Pas…");
    }
}
