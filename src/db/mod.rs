//! Persistence module split across logical submodules.

mod connection;
mod error;
mod store;

pub use connection::data_dir;
pub use error::StoreError;
pub use store::{BookStore, Snapshot, Subscription, SubscriptionId};
