use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::Book;

/// Internal representation of the book entry form, shared between the add and
/// edit dialogs. Field values stay raw text until `parse_inputs` turns them
/// into a typed record; the store itself never validates.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) price: String,
    pub(crate) quantity: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

/// Fields available within the book form, in focus order.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum BookField {
    Id,
    Title,
    Author,
    Price,
    Quantity,
}

impl Default for BookField {
    fn default() -> Self {
        BookField::Id
    }
}

impl BookForm {
    /// Populate the form from an existing record when entering edit mode.
    pub(crate) fn from_book(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            price: book.price.to_string(),
            quantity: book.quantity.to_string(),
            active: BookField::Id,
            error: None,
        }
    }

    /// Move focus to the next field.
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            BookField::Id => BookField::Title,
            BookField::Title => BookField::Author,
            BookField::Author => BookField::Price,
            BookField::Price => BookField::Quantity,
            BookField::Quantity => BookField::Id,
        };
    }

    /// Move focus to the previous field.
    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            BookField::Id => BookField::Quantity,
            BookField::Title => BookField::Id,
            BookField::Author => BookField::Title,
            BookField::Price => BookField::Author,
            BookField::Quantity => BookField::Price,
        };
    }

    /// Append a character to the active field, filtering out keystrokes that
    /// could never form a valid value. Numeric fields accept digits, a single
    /// decimal point (price only), and a leading minus.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            BookField::Id => self.id.push(ch),
            BookField::Title => self.title.push(ch),
            BookField::Author => self.author.push(ch),
            BookField::Price => {
                let allowed = ch.is_ascii_digit()
                    || (ch == '.' && !self.price.contains('.'))
                    || (ch == '-' && self.price.is_empty());
                if !allowed {
                    return false;
                }
                self.price.push(ch);
            }
            BookField::Quantity => {
                let allowed = ch.is_ascii_digit() || (ch == '-' && self.quantity.is_empty());
                if !allowed {
                    return false;
                }
                self.quantity.push(ch);
            }
        }
        true
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Id => {
                self.id.pop();
            }
            BookField::Title => {
                self.title.pop();
            }
            BookField::Author => {
                self.author.pop();
            }
            BookField::Price => {
                self.price.pop();
            }
            BookField::Quantity => {
                self.quantity.pop();
            }
        }
    }

    /// Validate the inputs and return a typed record ready for persistence.
    /// This is the only validation gate in front of the store.
    pub(crate) fn parse_inputs(&self) -> Result<Book> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(anyhow!("Book id is required."));
        }
        let title = self.title.trim();
        if title.is_empty() {
            return Err(anyhow!("Title is required."));
        }
        let author = self.author.trim();
        if author.is_empty() {
            return Err(anyhow!("Author is required."));
        }
        let price = self
            .price
            .trim()
            .parse::<f64>()
            .context("Price must be a number.")?;
        let quantity = self
            .quantity
            .trim()
            .parse::<i64>()
            .context("Quantity must be a whole number.")?;

        Ok(Book {
            id: id.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            price,
            quantity,
        })
    }

    /// Render a single styled line for the modal form widget.
    pub(crate) fn build_line(&self, field_name: &str, field: BookField) -> Line<'static> {
        let (value, is_active) = (self.value(field), self.active == field);

        let display = if value.is_empty() {
            "<required>".to_string()
        } else {
            value.to_string()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    /// Return the character count for the requested field. Drives cursor
    /// placement in the dialog.
    pub(crate) fn value_len(&self, field: BookField) -> usize {
        self.value(field).chars().count()
    }

    fn value(&self, field: BookField) -> &str {
        match field {
            BookField::Id => &self.id,
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Price => &self.price,
            BookField::Quantity => &self.quantity,
        }
    }
}

/// State carried while the delete confirmation dialog is open.
#[derive(Clone)]
pub(crate) struct ConfirmBookDelete {
    pub(crate) id: String,
    pub(crate) title: String,
}

impl ConfirmBookDelete {
    /// Build the confirmation state from the record being considered.
    pub(crate) fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            title: book.title.clone(),
        }
    }
}
