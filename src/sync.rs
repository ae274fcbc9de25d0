//! Converts successive full snapshots from the record store's live query into
//! minimal display patches, so a list view only touches the rows that
//! actually changed.

use std::collections::HashSet;

use crate::db::Snapshot;
use crate::models::Book;

/// One step of an edit script transforming the previously rendered list into
/// the next snapshot. Indices refer to the list as it stands after all
/// preceding edits in the same script have been applied.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEdit {
    /// A record appeared whose id was not rendered before.
    Insert { index: usize, book: Book },
    /// The record rendered at `index` is gone from the new snapshot.
    Remove { index: usize },
    /// A rendered record changed position without changing identity.
    Move { from: usize, to: usize },
    /// The record at `index` kept its id but its content changed.
    Update { index: usize, book: Book },
}

/// Stateful diff over consecutive snapshots.
///
/// Two records are the same item iff their ids are equal; a matched item is
/// unchanged iff every field compares equal. The synchronizer holds nothing
/// beyond the single most recently rendered snapshot, and `apply` is a
/// deterministic function of (previous, next): identical inputs always
/// produce identical edit scripts.
#[derive(Debug, Default)]
pub struct ListSynchronizer {
    rendered: Snapshot,
}

impl ListSynchronizer {
    /// Synchronizer with an empty rendering, as a freshly subscribed consumer
    /// starts out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the rendered snapshot. Called when a consumer resubscribes, so
    /// the next `apply` emits inserts for the entire snapshot.
    pub fn reset(&mut self) {
        self.rendered.clear();
    }

    /// The snapshot the consumer is assumed to be displaying.
    pub fn rendered(&self) -> &[Book] {
        &self.rendered
    }

    /// Diff `next` against the rendered snapshot and return the minimal
    /// ordered edit script, then adopt `next` as the new rendered state.
    pub fn apply(&mut self, next: Snapshot) -> Vec<ListEdit> {
        let next_ids: HashSet<&str> = next.iter().map(|book| book.id.as_str()).collect();
        let mut edits = Vec::new();
        let mut working: Vec<Book> = self.rendered.clone();

        // Removals first, back to front so earlier indices stay valid.
        for index in (0..working.len()).rev() {
            if !next_ids.contains(working[index].id.as_str()) {
                working.remove(index);
                edits.push(ListEdit::Remove { index });
            }
        }

        // Walk the target order, placing each record where it belongs.
        for (target, book) in next.iter().enumerate() {
            let position = working.iter().position(|row| row.id == book.id);
            match position {
                None => {
                    working.insert(target, book.clone());
                    edits.push(ListEdit::Insert {
                        index: target,
                        book: book.clone(),
                    });
                }
                Some(current) => {
                    if current != target {
                        let row = working.remove(current);
                        working.insert(target, row);
                        edits.push(ListEdit::Move {
                            from: current,
                            to: target,
                        });
                    }
                    if working[target] != *book {
                        working[target] = book.clone();
                        edits.push(ListEdit::Update {
                            index: target,
                            book: book.clone(),
                        });
                    }
                }
            }
        }

        self.rendered = next;
        edits
    }
}

#[cfg(test)]
mod tests {
    use super::{ListEdit, ListSynchronizer};
    use crate::models::Book;

    fn book(id: &str, quantity: i64) -> Book {
        Book {
            id: id.to_string(),
            title: format!("Title {id}"),
            author: format!("Author {id}"),
            price: 10.0,
            quantity,
        }
    }

    /// Replay an edit script over a starting list the way a view would.
    fn replay(start: &[Book], edits: &[ListEdit]) -> Vec<Book> {
        let mut rows = start.to_vec();
        for edit in edits {
            match edit {
                ListEdit::Insert { index, book } => rows.insert(*index, book.clone()),
                ListEdit::Remove { index } => {
                    rows.remove(*index);
                }
                ListEdit::Move { from, to } => {
                    let row = rows.remove(*from);
                    rows.insert(*to, row);
                }
                ListEdit::Update { index, book } => rows[*index] = book.clone(),
            }
        }
        rows
    }

    #[test]
    fn content_change_is_a_single_update() {
        let mut sync = ListSynchronizer::new();
        sync.apply(vec![book("1", 5)]);

        let edits = sync.apply(vec![book("1", 7)]);
        assert_eq!(
            edits,
            vec![ListEdit::Update {
                index: 0,
                book: book("1", 7)
            }]
        );
    }

    #[test]
    fn removal_leaves_remaining_rows_untouched() {
        let mut sync = ListSynchronizer::new();
        sync.apply(vec![book("a", 1), book("b", 2)]);

        let edits = sync.apply(vec![book("b", 2)]);
        assert_eq!(edits, vec![ListEdit::Remove { index: 0 }]);
    }

    #[test]
    fn initial_snapshot_becomes_inserts_in_order() {
        let mut sync = ListSynchronizer::new();
        let edits = sync.apply(vec![book("a", 1), book("b", 2)]);
        assert_eq!(
            edits,
            vec![
                ListEdit::Insert {
                    index: 0,
                    book: book("a", 1)
                },
                ListEdit::Insert {
                    index: 1,
                    book: book("b", 2)
                },
            ]
        );
    }

    #[test]
    fn identical_snapshots_yield_no_edits() {
        let mut sync = ListSynchronizer::new();
        sync.apply(vec![book("a", 1), book("b", 2)]);
        assert!(sync.apply(vec![book("a", 1), book("b", 2)]).is_empty());
    }

    #[test]
    fn reorder_is_expressed_as_a_move() {
        let mut sync = ListSynchronizer::new();
        sync.apply(vec![book("a", 1), book("b", 2)]);

        let edits = sync.apply(vec![book("b", 2), book("a", 1)]);
        assert_eq!(edits, vec![ListEdit::Move { from: 1, to: 0 }]);
    }

    #[test]
    fn reset_makes_the_next_snapshot_fully_inserted() {
        let mut sync = ListSynchronizer::new();
        sync.apply(vec![book("a", 1)]);
        sync.reset();

        let edits = sync.apply(vec![book("a", 1)]);
        assert_eq!(
            edits,
            vec![ListEdit::Insert {
                index: 0,
                book: book("a", 1)
            }]
        );
    }

    #[test]
    fn replaying_edits_reproduces_the_next_snapshot() {
        let transitions: Vec<(Vec<Book>, Vec<Book>)> = vec![
            (vec![], vec![book("a", 1), book("b", 2), book("c", 3)]),
            (
                vec![book("a", 1), book("b", 2), book("c", 3)],
                vec![book("c", 3), book("a", 9), book("d", 4)],
            ),
            (
                vec![book("a", 1), book("b", 2)],
                vec![book("b", 5), book("a", 1)],
            ),
            (vec![book("a", 1), book("b", 2), book("c", 3)], vec![]),
        ];

        for (prev, next) in transitions {
            let mut sync = ListSynchronizer::new();
            sync.apply(prev.clone());
            let edits = sync.apply(next.clone());
            assert_eq!(replay(&prev, &edits), next, "prev={prev:?}");
            assert_eq!(sync.rendered(), next.as_slice());
        }
    }

    #[test]
    fn identical_inputs_produce_identical_scripts() {
        let prev = vec![book("a", 1), book("b", 2), book("c", 3)];
        let next = vec![book("b", 7), book("c", 3), book("e", 5)];

        let mut first = ListSynchronizer::new();
        first.apply(prev.clone());
        let mut second = ListSynchronizer::new();
        second.apply(prev);

        assert_eq!(first.apply(next.clone()), second.apply(next));
    }
}
