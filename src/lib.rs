//! # Keepsake
//!
//! Reactive state that survives a reload, and small actions for UI elements.
//!
//! ## Stores
//!
//! - `Store<T>` - Observable value; subscribers see the current value
//!   immediately and every change after it, in order
//! - `PersistedStore<T, S>` - A store mirrored to a key-value `Storage`
//!   entry as JSON, seeded from a default when the entry is missing
//!
//! ## Storage
//!
//! - `MemoryStorage` - In-process map, handy for tests
//! - `FileStorage` - One JSON document on disk
//! - `LocalStorage` - The browser's `localStorage` (`web` feature)
//!
//! ## Actions
//!
//! - `select_on_focus` - Select an input's content whenever it gains focus
//!
//! ```
//! use keepsake::{MemoryStorage, PersistedStore};
//!
//! let todos = PersistedStore::new(MemoryStorage::new(), "todos", Vec::<String>::new())?;
//! let _sub = todos.subscribe(|todos| println!("{} todos", todos.len()));
//! todos.update(|todos| todos.push("Visit MDN web docs".to_string()))?;
//! # Ok::<(), keepsake::Error>(())
//! ```

pub mod action;
pub mod codec;
pub mod config;
mod error;
pub mod storage;
pub mod store;

// Re-export main types for convenience
pub use action::{select_on_focus, FocusSelection};
pub use config::{CorruptEntryPolicy, Format, PersistOptions};
pub use error::{Error, Result};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
#[cfg(feature = "web")]
pub use storage::LocalStorage;
pub use store::{PersistedStore, Readable, Store, Subscription};
