//! Observable value containers.
//!
//! [`Store`] is the in-memory primitive: a value plus an ordered list of
//! subscribers that are notified synchronously on every write.
//! [`PersistedStore`] wraps a `Store` and writes every value through to a
//! [`Storage`](crate::storage::Storage) backend before it becomes current.

mod persisted;
mod store;
mod subscription;

pub use persisted::PersistedStore;
pub use store::{Readable, Store};
pub use subscription::Subscription;
