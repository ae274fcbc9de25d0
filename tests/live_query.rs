use bookstore_inventory::{Book, BookStore};

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
fn subscribe_delivers_current_snapshot_immediately() {
    let mut store = BookStore::open_in_memory().unwrap();
    store
        .insert_or_replace(&book("b1", "Dune", "Herbert", 12.5, 3))
        .unwrap();

    let subscription = store.subscribe().unwrap();
    let initial = subscription.try_recv().expect("initial snapshot is queued");
    assert_eq!(initial.len(), 1);
    assert_eq!(initial[0].id, "b1");
}

#[test]
fn every_effective_mutation_delivers_a_snapshot() {
    let mut store = BookStore::open_in_memory().unwrap();
    let subscription = store.subscribe().unwrap();
    assert_eq!(subscription.try_recv().unwrap(), vec![]);

    store
        .insert_or_replace(&book("b1", "Dune", "Herbert", 12.5, 3))
        .unwrap();
    assert_eq!(subscription.try_recv().unwrap().len(), 1);

    store
        .update(&book("b1", "Dune", "Herbert", 12.5, 4))
        .unwrap();
    assert_eq!(subscription.try_recv().unwrap()[0].quantity, 4);

    store.delete("b1").unwrap();
    assert_eq!(subscription.try_recv().unwrap(), vec![]);
}

#[test]
fn noop_delete_emits_no_snapshot() {
    let mut store = BookStore::open_in_memory().unwrap();
    let subscription = store.subscribe().unwrap();
    subscription.try_recv().unwrap();

    store.delete("missing").unwrap();

    assert!(subscription.try_recv().is_none(), "nothing changed to emit");
}

/// The end-to-end lifecycle of one record: a subscriber present throughout
/// observes exactly four snapshots, including the starting empty one.
#[test]
fn subscriber_observes_full_record_lifecycle() {
    let mut store = BookStore::open_in_memory().unwrap();
    let subscription = store.subscribe().unwrap();

    store
        .insert_or_replace(&book("b1", "Dune", "Herbert", 12.5, 3))
        .unwrap();
    store.update(&book("b1", "Dune", "Herbert", 12.5, 0)).unwrap();
    store.delete("b1").unwrap();

    let mut snapshots = Vec::new();
    while let Some(snapshot) = subscription.try_recv() {
        snapshots.push(snapshot);
    }

    assert_eq!(snapshots.len(), 4);
    assert!(snapshots[0].is_empty());
    assert_eq!(snapshots[1], vec![book("b1", "Dune", "Herbert", 12.5, 3)]);
    assert_eq!(snapshots[2], vec![book("b1", "Dune", "Herbert", 12.5, 0)]);
    assert!(snapshots[3].is_empty());
    assert!(store.query_all().unwrap().is_empty());
}

#[test]
fn subscribers_receive_independent_streams() {
    let mut store = BookStore::open_in_memory().unwrap();
    let first = store.subscribe().unwrap();
    let second = store.subscribe().unwrap();

    store
        .insert_or_replace(&book("b1", "Dune", "Herbert", 12.5, 3))
        .unwrap();

    // Each gets its own initial snapshot plus the change.
    assert!(first.try_recv().unwrap().is_empty());
    assert_eq!(first.try_recv().unwrap().len(), 1);
    assert!(second.try_recv().unwrap().is_empty());
    assert_eq!(second.try_recv().unwrap().len(), 1);
}

#[test]
fn unsubscribe_stops_delivery() {
    let mut store = BookStore::open_in_memory().unwrap();
    let subscription = store.subscribe().unwrap();
    subscription.try_recv().unwrap();

    store.unsubscribe(subscription.id());
    store
        .insert_or_replace(&book("b1", "Dune", "Herbert", 12.5, 3))
        .unwrap();

    assert!(subscription.recv().is_none(), "channel is closed after unsubscribe");
    assert_eq!(store.subscriber_count(), 0);
}

#[test]
fn dropped_subscription_is_pruned_on_next_notification() {
    let mut store = BookStore::open_in_memory().unwrap();
    let subscription = store.subscribe().unwrap();
    assert_eq!(store.subscriber_count(), 1);

    drop(subscription);
    store
        .insert_or_replace(&book("b1", "Dune", "Herbert", 12.5, 3))
        .unwrap();

    assert_eq!(store.subscriber_count(), 0);
}

#[test]
fn latest_coalesces_bursts_to_the_most_recent_snapshot() {
    let mut store = BookStore::open_in_memory().unwrap();
    let subscription = store.subscribe().unwrap();

    store
        .insert_or_replace(&book("b1", "Dune", "Herbert", 12.5, 3))
        .unwrap();
    store
        .insert_or_replace(&book("b2", "Emma", "Austen", 8.0, 2))
        .unwrap();

    let latest = subscription.latest().expect("snapshots pending");
    assert_eq!(latest.len(), 2);
    assert!(subscription.try_recv().is_none(), "queue fully drained");
}
