use bookstore_inventory::{Book, BookStore, StoreError};

fn book(id: &str, title: &str, author: &str, price: f64, quantity: i64) -> Book {
    Book {
        id: id.to_string(),
        title: title.to_string(),
        author: author.to_string(),
        price,
        quantity,
    }
}

#[test]
fn insert_then_query_roundtrip() {
    let mut store = BookStore::open_in_memory().unwrap();

    let dune = book("b1", "Dune", "Herbert", 12.5, 3);
    store.insert_or_replace(&dune).unwrap();

    let snapshot = store.query_all().unwrap();
    assert_eq!(snapshot, vec![dune]);
}

#[test]
fn replace_overwrites_record_with_same_id() {
    let mut store = BookStore::open_in_memory().unwrap();

    store
        .insert_or_replace(&book("b1", "Dune", "Herbert", 12.5, 3))
        .unwrap();
    let second = book("b1", "Dune Messiah", "Frank Herbert", 9.99, 7);
    store.insert_or_replace(&second).unwrap();

    let snapshot = store.query_all().unwrap();
    assert_eq!(snapshot, vec![second], "last write wins under one id");
}

#[test]
fn update_of_missing_id_inserts_silently() {
    let mut store = BookStore::open_in_memory().unwrap();

    // No not-found error: update and insert share replace semantics.
    store
        .update(&book("ghost", "Phantom", "Nobody", 1.0, 1))
        .unwrap();

    let snapshot = store.query_all().unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, "ghost");
}

#[test]
fn delete_of_missing_id_is_a_noop() {
    let mut store = BookStore::open_in_memory().unwrap();
    store
        .insert_or_replace(&book("b1", "Dune", "Herbert", 12.5, 3))
        .unwrap();

    store.delete("does-not-exist").unwrap();

    assert_eq!(store.query_all().unwrap().len(), 1);
}

#[test]
fn snapshots_keep_storage_order_across_edits() {
    let mut store = BookStore::open_in_memory().unwrap();
    store
        .insert_or_replace(&book("a", "A", "First", 1.0, 1))
        .unwrap();
    store
        .insert_or_replace(&book("b", "B", "Second", 2.0, 2))
        .unwrap();
    store
        .insert_or_replace(&book("c", "C", "Third", 3.0, 3))
        .unwrap();

    // Editing the middle record must not move it to the end of the list.
    store.update(&book("b", "B revised", "Second", 2.5, 9)).unwrap();

    let ids: Vec<String> = store
        .query_all()
        .unwrap()
        .into_iter()
        .map(|record| record.id)
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[test]
fn unusable_path_surfaces_storage_error() {
    // A database path beneath a regular file can never be opened.
    let blocker = tempfile::NamedTempFile::new().unwrap();
    let err = BookStore::open_at(blocker.path().join("books.sqlite"))
        .err()
        .expect("opening beneath a file must fail");

    match err {
        StoreError::Unavailable(_) => {}
        other => panic!("expected StoreError::Unavailable, got {other:?}"),
    }
}
