//! Domain model that mirrors the SQLite schema and gets passed throughout the
//! TUI. The type stays a light-weight data holder so other layers can focus
//! on presentation and persistence logic.

#[derive(Debug, Clone, PartialEq)]
/// One book record as stored in the `books` table. Equality compares every
/// field; the list synchronizer relies on this to decide whether a row with a
/// matching id actually changed.
pub struct Book {
    /// Caller-supplied primary key. The store never generates ids; the entry
    /// form requires a non-blank value before anything is persisted.
    pub id: String,
    /// Title displayed in the list and detail views.
    pub title: String,
    /// Author shown next to the title.
    pub author: String,
    /// Unit price. No range is enforced at the store level.
    pub price: f64,
    /// Copies in stock. No range is enforced at the store level.
    pub quantity: i64,
}

impl Book {
    /// Compose a `Title - Author` string that gracefully omits the hyphen if
    /// the author is blank. Status messages and the details dialog rely on
    /// this ready-to-use formatting.
    pub fn summary(&self) -> String {
        if self.author.trim().is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.author)
        }
    }
}
