use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use log::{error, info};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::db::{BookStore, Subscription};
use crate::models::Book;
use crate::sync::{ListEdit, ListSynchronizer};

use super::forms::{BookField, BookForm, ConfirmBookDelete};
use super::helpers::{centered_rect, format_price, surface_error};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;

/// Fine-grained modes layered over the book list. Keeping this explicit makes
/// it easy to reason about which dialog is open and what keys should do.
enum Mode {
    Normal,
    AddingBook(BookForm),
    EditingBook(BookForm),
    ConfirmDelete(ConfirmBookDelete),
    ViewingDetails(Book),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
///
/// The rendered rows are never re-fetched wholesale: the store's live query
/// pushes snapshots, and the synchronizer's edit scripts patch `books` row by
/// row, exactly as the list widget displays them.
pub struct App {
    store: BookStore,
    subscription: Subscription,
    sync: ListSynchronizer,
    books: Vec<Book>,
    selected: usize,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Register the live query and start with an empty rendering; the first
    /// `pump_store` call before the initial draw brings in the current
    /// snapshot.
    pub fn new(mut store: BookStore) -> Result<Self> {
        let subscription = store.subscribe()?;
        Ok(Self {
            store,
            subscription,
            sync: ListSynchronizer::new(),
            books: Vec::new(),
            selected: 0,
            mode: Mode::Normal,
            status: None,
        })
    }

    /// Drain the live query and patch the rendered rows with the resulting
    /// edit script. Bursts of mutations coalesce into one repaint.
    pub(crate) fn pump_store(&mut self) {
        if let Some(snapshot) = self.subscription.latest() {
            for edit in self.sync.apply(snapshot) {
                match edit {
                    ListEdit::Insert { index, book } => self.books.insert(index, book),
                    ListEdit::Remove { index } => {
                        self.books.remove(index);
                    }
                    ListEdit::Move { from, to } => {
                        let row = self.books.remove(from);
                        self.books.insert(to, row);
                    }
                    ListEdit::Update { index, book } => self.books[index] = book,
                }
            }
            if self.selected >= self.books.len() {
                self.selected = self.books.len().saturating_sub(1);
            }
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingBook(form) => self.handle_add_book(code, form)?,
            Mode::EditingBook(form) => self.handle_edit_book(code, form)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
            Mode::ViewingDetails(book) => Self::handle_view_details(code, book),
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-5),
            KeyCode::PageDown => self.move_selection(5),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.books.len().saturating_sub(1),
            KeyCode::Char('+') => {
                self.clear_status();
                return Ok(Mode::AddingBook(BookForm::default()));
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if let Some(book) = self.current_book().cloned() {
                    self.clear_status();
                    return Ok(Mode::EditingBook(BookForm::from_book(&book)));
                } else {
                    self.set_status("No book selected to edit.", StatusKind::Error);
                }
            }
            KeyCode::Char('-') => {
                if let Some(book) = self.current_book() {
                    let confirm = ConfirmBookDelete::from(book);
                    self.clear_status();
                    return Ok(Mode::ConfirmDelete(confirm));
                } else {
                    self.set_status("No book selected to delete.", StatusKind::Error);
                }
            }
            KeyCode::Enter => {
                if let Some(book) = self.current_book().cloned() {
                    self.clear_status();
                    return Ok(Mode::ViewingDetails(book));
                } else {
                    self.set_status("No book selected.", StatusKind::Error);
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab => form.next_field(),
            KeyCode::BackTab => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_book(&form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::AddingBook(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_edit_book(&mut self, code: KeyCode, mut form: BookForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab => form.next_field(),
            KeyCode::BackTab => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_existing_book(&form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::EditingBook(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmBookDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_delete(&confirm) {
                    Ok(_) => Ok(Mode::Normal),
                    Err(err) => {
                        let message = surface_error(&err);
                        error!("delete failed id={}: {message}", confirm.id);
                        self.set_status(message, StatusKind::Error);
                        Ok(Mode::ConfirmDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    fn handle_view_details(code: KeyCode, book: Book) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Mode::Normal,
            _ => Mode::ViewingDetails(book),
        }
    }

    fn save_new_book(&mut self, form: &BookForm) -> Result<()> {
        let book = form.parse_inputs()?;
        self.store.insert_or_replace(&book)?;
        info!("book added id={}", book.id);
        self.focus_book(&book.id);
        self.set_status(format!("Added '{}'.", book.summary()), StatusKind::Info);
        Ok(())
    }

    fn save_existing_book(&mut self, form: &BookForm) -> Result<()> {
        let book = form.parse_inputs()?;
        self.store.update(&book)?;
        info!("book updated id={}", book.id);
        self.focus_book(&book.id);
        self.set_status(format!("Updated '{}'.", book.summary()), StatusKind::Info);
        Ok(())
    }

    fn perform_delete(&mut self, confirm: &ConfirmBookDelete) -> Result<()> {
        self.store.delete(&confirm.id)?;
        info!("book deleted id={}", confirm.id);
        self.set_status(format!("Deleted '{}'.", confirm.title), StatusKind::Info);
        Ok(())
    }

    fn current_book(&self) -> Option<&Book> {
        self.books.get(self.selected)
    }

    fn move_selection(&mut self, offset: isize) {
        if self.books.is_empty() {
            self.selected = 0;
            return;
        }
        let last = self.books.len() - 1;
        let target = self.selected as isize + offset;
        self.selected = target.clamp(0, last as isize) as usize;
    }

    /// Put the selection on the given id once the next snapshot lands. The
    /// mutation has already been applied, so the row is present after one
    /// pump; if it is not yet rendered, leave the selection where it is.
    fn focus_book(&mut self, id: &str) {
        self.pump_store();
        if let Some(index) = self.books.iter().position(|book| book.id == id) {
            self.selected = index;
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        self.draw_book_list(frame, content_area);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, "Add Book", form),
            Mode::EditingBook(form) => self.draw_book_form(frame, area, "Edit Book", form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::ViewingDetails(book) => self.draw_details(frame, area, book),
            Mode::Normal => {}
        }
    }

    fn draw_book_list(&self, frame: &mut Frame, area: Rect) {
        if self.books.is_empty() {
            let message = Paragraph::new("No books yet. Press '+' to add one.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::NONE));
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = self
            .books
            .iter()
            .map(|book| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        book.title.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(format!(" by {}", book.author)),
                    Span::styled(
                        format!("  {}", format_price(book.price)),
                        Style::default().fg(Color::Green),
                    ),
                    Span::styled(
                        format!("  x{}", book.quantity),
                        Style::default().fg(Color::Cyan),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Inventory ({})", self.books.len())),
            )
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let line = match &self.status {
            Some(status) => Line::from(Span::styled(status.text.clone(), status.kind.style())),
            None => Line::from(Span::styled(
                "Up/Down move | + add | e edit | - delete | Enter details | q quit",
                Style::default().fg(Color::Gray),
            )),
        };

        let footer = Paragraph::new(line)
            .alignment(Alignment::Left)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, area);
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &BookForm) {
        let popup_area = centered_rect(60, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line("Id", BookField::Id),
            form.build_line("Title", BookField::Title),
            form.build_line("Author", BookField::Author),
            form.build_line("Price", BookField::Price),
            form.build_line("Quantity", BookField::Quantity),
            Line::from(""),
        ];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save | Tab to switch | Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (prefix, row) = match form.active {
            BookField::Id => ("Id: ", 0),
            BookField::Title => ("Title: ", 1),
            BookField::Author => ("Author: ", 2),
            BookField::Price => ("Price: ", 3),
            BookField::Quantity => ("Quantity: ", 4),
        };
        frame.set_cursor_position((
            inner.x + prefix.len() as u16 + form.value_len(form.active) as u16,
            inner.y + row,
        ));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBookDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Deletion")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("'{}' will be deleted?", confirm.title)),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_details(&self, frame: &mut Frame, area: Rect, book: &Book) {
        let popup_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Book Details").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Id: {}", book.id)),
            Line::from(format!("Title: {}", book.title)),
            Line::from(format!("Author: {}", book.author)),
            Line::from(format!("Price: {}", format_price(book.price))),
            Line::from(format!("Quantity: {}", book.quantity)),
            Line::from(""),
            Line::from(Span::styled(
                "Press Esc to close.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }
}
