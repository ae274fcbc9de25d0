use std::path::Path;
use std::sync::mpsc::{channel, Receiver, Sender};

use log::debug;
use rusqlite::{params, Connection};

use crate::models::Book;

use super::connection;
use super::error::StoreError;

/// The full ordered record set at a point in time, in storage order.
pub type Snapshot = Vec<Book>;

/// Identifies one live query registration for explicit cancellation.
pub type SubscriptionId = u64;

/// Durable key-value table of book records plus a live query of all rows.
///
/// The store is an explicitly constructed, explicitly owned object: whoever
/// needs persistence receives it from its creator instead of reaching for a
/// process-wide handle. One store instance per process falls out of `main`
/// constructing exactly one.
///
/// Mutations are synchronous and have completed durably by the time they
/// return. The store expects a single logical writer; it does no locking of
/// its own.
pub struct BookStore {
    conn: Connection,
    subscribers: Vec<Subscriber>,
    next_subscriber: SubscriptionId,
}

/// Registered half of a live query. The sending end goes stale once the
/// matching [`Subscription`] is dropped, at which point notification prunes it.
struct Subscriber {
    id: SubscriptionId,
    sender: Sender<Snapshot>,
}

/// Receiving handle of a live query created by [`BookStore::subscribe`].
///
/// The current snapshot is already queued when the handle is returned, and
/// every effective mutation queues a fresh one. Snapshots arrive as discrete
/// ordered events; nothing is ever delivered out of order. Dropping the
/// handle ends the subscription (the store notices on its next notification);
/// [`BookStore::unsubscribe`] removes it eagerly.
pub struct Subscription {
    id: SubscriptionId,
    receiver: Receiver<Snapshot>,
}

impl Subscription {
    /// Identifier to pass to [`BookStore::unsubscribe`].
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Block until the next snapshot arrives. Returns `None` once the
    /// subscription has been cancelled or the store dropped.
    pub fn recv(&self) -> Option<Snapshot> {
        self.receiver.recv().ok()
    }

    /// Non-blocking variant of [`recv`](Self::recv). `None` means no snapshot
    /// is currently pending.
    pub fn try_recv(&self) -> Option<Snapshot> {
        self.receiver.try_recv().ok()
    }

    /// Drain every pending snapshot and return only the most recent one.
    /// Render loops use this to coalesce bursts of mutations into a single
    /// repaint.
    pub fn latest(&self) -> Option<Snapshot> {
        let mut latest = None;
        while let Some(snapshot) = self.try_recv() {
            latest = Some(snapshot);
        }
        latest
    }
}

impl BookStore {
    /// Open the store at its default location under the user's home,
    /// creating the data directory and schema on first use.
    pub fn open_default() -> Result<Self, StoreError> {
        Ok(Self::from_connection(connection::open_default()?))
    }

    /// Open the store backed by a database file at an explicit path.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self::from_connection(connection::open_at(path)?))
    }

    /// Store backed by an in-memory database. Used by tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self::from_connection(connection::open_in_memory()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            subscribers: Vec::new(),
            next_subscriber: 0,
        }
    }

    /// Persist `book`, overwriting any existing record with the same id.
    ///
    /// Duplicate ids are not an error: the semantics are last-write-wins by
    /// definition. The upsert keeps the original rowid, so a replaced record
    /// holds its position in storage order instead of jumping to the end.
    /// Live queries are notified with the updated snapshot.
    pub fn insert_or_replace(&mut self, book: &Book) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO books (id, title, author, price, quantity)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                 title = excluded.title,
                 author = excluded.author,
                 price = excluded.price,
                 quantity = excluded.quantity",
            params![book.id, book.title, book.author, book.price, book.quantity],
        )?;
        debug!("persisted book id={}", book.id);
        self.notify()
    }

    /// Persist new field values for an existing record.
    ///
    /// Identical to [`insert_or_replace`](Self::insert_or_replace) at the
    /// store level; the distinction is a caller-side intent label. An update
    /// whose id does not exist silently inserts the record instead of
    /// raising a not-found error.
    pub fn update(&mut self, book: &Book) -> Result<(), StoreError> {
        self.insert_or_replace(book)
    }

    /// Remove the record with the given id if present. A missing id is a
    /// silent no-op; subscribers are only notified when a row was actually
    /// removed.
    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let deleted = self
            .conn
            .execute("DELETE FROM books WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Ok(());
        }
        debug!("deleted book id={id}");
        self.notify()
    }

    /// One-shot read of the current record set in storage order.
    pub fn query_all(&self) -> Result<Snapshot, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, author, price, quantity FROM books ORDER BY rowid",
        )?;
        let books = stmt
            .query_map([], |row| {
                Ok(Book {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    author: row.get(2)?,
                    price: row.get(3)?,
                    quantity: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(books)
    }

    /// Register a live query. The current snapshot is delivered immediately;
    /// every effective mutation afterwards delivers a fresh full snapshot.
    /// Each subscriber receives its own independent sequence.
    pub fn subscribe(&mut self) -> Result<Subscription, StoreError> {
        let snapshot = self.query_all()?;
        let (sender, receiver) = channel();
        // Cannot fail: the receiving half is still in scope right here.
        let _ = sender.send(snapshot);

        let id = self.next_subscriber;
        self.next_subscriber += 1;
        self.subscribers.push(Subscriber { id, sender });
        debug!("live query registered id={id}");
        Ok(Subscription { id, receiver })
    }

    /// Cancel a live query, releasing its registration. Unknown ids are
    /// ignored, which also covers handles already pruned after being dropped.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|subscriber| subscriber.id != id);
    }

    /// Number of currently registered live queries.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Push the current snapshot to every live query, dropping registrations
    /// whose receiving half has gone away.
    ///
    /// A failure reading the snapshot surfaces to the mutating caller, but
    /// the registrations stay intact: the stream does not terminate on a
    /// single failed operation, it simply emits nothing for it.
    fn notify(&mut self) -> Result<(), StoreError> {
        if self.subscribers.is_empty() {
            return Ok(());
        }
        let snapshot = self.query_all()?;
        self.subscribers
            .retain(|subscriber| subscriber.sender.send(snapshot.clone()).is_ok());
        Ok(())
    }
}
