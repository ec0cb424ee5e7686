use super::{Readable, Store, Subscription};
use crate::codec;
use crate::config::{CorruptEntryPolicy, PersistOptions};
use crate::error::{Error, Result};
use crate::storage::Storage;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A [`Store`] whose value is mirrored to a [`Storage`] entry.
///
/// On creation the store takes its value from the entry under `key`, or seeds
/// the entry with `initial` if it is missing. Every later write is encoded and
/// written to storage first; only once that succeeds does the in-memory value
/// change and subscribers get notified. A failed write leaves both sides as
/// they were.
///
/// Clones share the value, the subscribers and the backend. Writes through
/// any clone are serialized, so the storage entry and the in-memory value
/// always end on the same write. `update` reads and writes in two steps, so
/// concurrent `update`s from different threads can still lose one another's
/// changes; one writer per key is the intended use.
///
/// # Examples
///
/// ```
/// use keepsake::{MemoryStorage, PersistedStore, Storage};
///
/// let storage = MemoryStorage::new();
/// let theme = PersistedStore::new(storage.clone(), "theme", "light".to_string())?;
/// assert_eq!(storage.get_item("theme")?.as_deref(), Some("\"light\""));
///
/// theme.set("dark".to_string())?;
/// assert_eq!(storage.get_item("theme")?.as_deref(), Some("\"dark\""));
/// # Ok::<(), keepsake::Error>(())
/// ```
pub struct PersistedStore<T, S> {
    key: Arc<str>,
    storage: S,
    options: PersistOptions,
    inner: Store<T>,
    write_lock: Arc<Mutex<()>>,
}

impl<T, S> PersistedStore<T, S>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    S: Storage,
{
    /// Create a store for `key` with default [`PersistOptions`].
    pub fn new(storage: S, key: impl Into<String>, initial: T) -> Result<Self> {
        Self::with_options(storage, key, initial, PersistOptions::default())
    }

    /// Create a store for `key`.
    ///
    /// Fails with [`Error::EmptyKey`] for an empty key, with
    /// [`Error::Serialization`] if `initial` has to be written and cannot be
    /// encoded, and with [`Error::Deserialization`] if the existing entry is
    /// unreadable under [`CorruptEntryPolicy::FailFast`].
    pub fn with_options(
        storage: S,
        key: impl Into<String>,
        initial: T,
        options: PersistOptions,
    ) -> Result<Self> {
        let key: String = key.into();
        if key.is_empty() {
            return Err(Error::EmptyKey);
        }

        let value = match storage.get_item(&key)? {
            None => {
                let text = encode(&key, &initial, &options)?;
                storage.set_item(&key, &text)?;
                log::debug!("seeded `{key}` with its default value");
                initial
            }
            Some(text) => match codec::decode::<T>(&text) {
                Ok(value) => {
                    log::debug!("loaded `{key}` from storage");
                    value
                }
                Err(source) => match options.on_corrupt {
                    CorruptEntryPolicy::FailFast => {
                        return Err(Error::Deserialization { key, source });
                    }
                    CorruptEntryPolicy::ResetToInitial => {
                        log::warn!("stored entry for `{key}` is unreadable ({source}); resetting it");
                        let text = encode(&key, &initial, &options)?;
                        storage.set_item(&key, &text)?;
                        initial
                    }
                },
            },
        };

        Ok(Self {
            key: key.into(),
            storage,
            options,
            inner: Store::new(value),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// The storage key this store writes to.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn options(&self) -> &PersistOptions {
        &self.options
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.inner.get()
    }

    /// Read the current value without cloning it.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.inner.read(f)
    }

    /// Subscribe to value changes.
    ///
    /// The listener runs right away with the current value and then after
    /// every successful write.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.inner.subscribe(listener)
    }

    /// Write `value` to storage, then make it current and notify subscribers.
    pub fn set(&self, value: T) -> Result<()> {
        let text = encode(&self.key, &value, &self.options)?;
        {
            let _write = self.lock_writes();
            self.storage.set_item(&self.key, &text)?;
            self.inner.stage(value);
        }
        log::debug!("wrote `{}` ({} bytes)", self.key, text.len());
        // Subscribers run outside the write lock so they may write back.
        self.inner.drain();
        Ok(())
    }

    /// Apply `f` to a copy of the current value and [`set`](Self::set) the
    /// result.
    ///
    /// `f` sees the in-memory value. If another writer changed the storage
    /// entry behind this store's back, that change is overwritten.
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut T),
    {
        let mut next = self.inner.get();
        f(&mut next);
        self.set(next)
    }

    /// Restore a default value. Same write path as [`set`](Self::set).
    pub fn reset(&self, initial: T) -> Result<()> {
        self.set(initial)
    }

    /// Pick up a change made directly to storage.
    ///
    /// A readable entry becomes the current value and subscribers are
    /// notified. A missing entry is re-seeded from the current value. An
    /// unreadable entry is handled by the store's [`CorruptEntryPolicy`],
    /// with the current value standing in for the default.
    pub fn reload(&self) -> Result<()> {
        let write = self.lock_writes();
        match self.storage.get_item(&self.key)? {
            None => {
                let text = encode(&self.key, &self.inner.get(), &self.options)?;
                self.storage.set_item(&self.key, &text)?;
                log::debug!("re-seeded missing `{}`", self.key);
                Ok(())
            }
            Some(text) => match codec::decode::<T>(&text) {
                Ok(value) => {
                    self.inner.stage(value);
                    drop(write);
                    self.inner.drain();
                    Ok(())
                }
                Err(source) => match self.options.on_corrupt {
                    CorruptEntryPolicy::FailFast => Err(Error::Deserialization {
                        key: self.key.to_string(),
                        source,
                    }),
                    CorruptEntryPolicy::ResetToInitial => {
                        log::warn!(
                            "stored entry for `{}` is unreadable ({source}); rewriting it",
                            self.key
                        );
                        let text = encode(&self.key, &self.inner.get(), &self.options)?;
                        self.storage.set_item(&self.key, &text)?;
                        Ok(())
                    }
                },
            },
        }
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no bad state.
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn encode<T>(key: &str, value: &T, options: &PersistOptions) -> Result<String>
where
    T: Serialize + DeserializeOwned,
{
    let encoded = if options.verify_round_trip {
        codec::encode_verified(value, options.format)
    } else {
        codec::encode(value, options.format)
    };
    encoded.map_err(|source| Error::Serialization {
        key: key.to_string(),
        source,
    })
}

impl<T, S> Readable<T> for PersistedStore<T, S>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    S: Storage,
{
    fn get(&self) -> T {
        PersistedStore::get(self)
    }

    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        PersistedStore::subscribe(self, listener)
    }
}

impl<T, S: Clone> Clone for PersistedStore<T, S> {
    fn clone(&self) -> Self {
        Self {
            key: Arc::clone(&self.key),
            storage: self.storage.clone(),
            options: self.options,
            inner: self.inner.clone(),
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}

impl<T: std::fmt::Debug, S> std::fmt::Debug for PersistedStore<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedStore")
            .field("key", &self.key)
            .field("options", &self.options)
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Format;
    use crate::storage::{MemoryStorage, StorageError};
    use serde::Deserialize;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Todo {
        id: u32,
        name: String,
        completed: bool,
    }

    fn initial_todos() -> Vec<Todo> {
        vec![
            Todo {
                id: 1,
                name: "Visit MDN web docs".to_string(),
                completed: true,
            },
            Todo {
                id: 2,
                name: "Complete the Svelte Tutorial".to_string(),
                completed: false,
            },
        ]
    }

    /// Storage that refuses every write.
    struct ReadOnly(MemoryStorage);

    impl Storage for ReadOnly {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get_item(key)
        }

        fn set_item(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Rejected {
                key: key.to_string(),
                reason: "quota exceeded".to_string(),
            })
        }

        fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            self.0.remove_item(key)
        }
    }

    #[test]
    fn seeds_missing_entry() {
        let storage = MemoryStorage::new();
        let store = PersistedStore::new(storage.clone(), "theme", "light".to_string()).unwrap();

        assert_eq!(store.get(), "light");
        assert_eq!(storage.get_item("theme").unwrap().as_deref(), Some("\"light\""));
    }

    #[test]
    fn loads_existing_entry_without_writing() {
        let storage = MemoryStorage::new();
        storage.set_item("theme", "\"dark\"").unwrap();

        let store = PersistedStore::new(storage.clone(), "theme", "light".to_string()).unwrap();

        assert_eq!(store.get(), "dark");
        assert_eq!(storage.get_item("theme").unwrap().as_deref(), Some("\"dark\""));
    }

    #[test]
    fn empty_key_is_rejected() {
        let err = PersistedStore::new(MemoryStorage::new(), "", 0).unwrap_err();
        assert!(matches!(err, Error::EmptyKey));
    }

    #[test]
    fn set_writes_through_then_notifies() {
        let storage = MemoryStorage::new();
        let store = PersistedStore::new(storage.clone(), "theme", "light".to_string()).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let _sub = {
            let seen = seen.clone();
            let storage = storage.clone();
            store.subscribe(move |value: &String| {
                // Storage is already up to date when subscribers run.
                let stored = storage.get_item("theme").unwrap().unwrap();
                seen.lock().unwrap().push((value.clone(), stored));
            })
        };

        store.set("dark".to_string()).unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ("light".to_string(), "\"light\"".to_string()),
                ("dark".to_string(), "\"dark\"".to_string()),
            ]
        );
    }

    #[test]
    fn update_goes_through_set() {
        let storage = MemoryStorage::new();
        let todos = PersistedStore::with_options(
            storage.clone(),
            "mdn-svelte-todo",
            initial_todos(),
            PersistOptions::default().format(Format::Compact),
        )
        .unwrap();

        todos
            .update(|todos| {
                todos.push(Todo {
                    id: 3,
                    name: "Ship it".to_string(),
                    completed: false,
                });
            })
            .unwrap();

        let stored: Vec<Todo> =
            serde_json::from_str(&storage.get_item("mdn-svelte-todo").unwrap().unwrap()).unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored, todos.get());
    }

    #[test]
    fn unencodable_value_changes_nothing() {
        let storage = MemoryStorage::new();
        let ratio = PersistedStore::new(storage.clone(), "ratio", 0.5_f64).unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let _sub = {
            let calls = calls.clone();
            ratio.subscribe(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        };

        let err = ratio.set(f64::INFINITY).unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
        assert_eq!(ratio.get(), 0.5);
        assert_eq!(storage.get_item("ratio").unwrap().as_deref(), Some("0.5"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn non_string_map_keys_are_a_serialization_error() {
        let storage = MemoryStorage::new();
        let cells = PersistedStore::new(storage.clone(), "cells", HashMap::<(i32, i32), u8>::new())
            .unwrap();
        assert_eq!(storage.get_item("cells").unwrap().as_deref(), Some("{}"));

        let err = cells.set(HashMap::from([((0, 0), 1)])).unwrap_err();
        assert!(matches!(err, Error::Serialization { ref key, .. } if key == "cells"));
        assert!(cells.get().is_empty());
        assert_eq!(storage.get_item("cells").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn unencodable_initial_is_not_written() {
        let storage = MemoryStorage::new();
        let err = PersistedStore::new(storage.clone(), "ratio", f64::NAN).unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
        assert!(storage.is_empty());
    }

    #[test]
    fn rejected_write_changes_nothing() {
        let backing = MemoryStorage::new();
        backing.set_item("count", "1").unwrap();
        let store = PersistedStore::new(ReadOnly(backing.clone()), "count", 0).unwrap();

        let err = store.set(2).unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::Rejected { .. })));
        assert_eq!(store.get(), 1);
        assert_eq!(backing.get_item("count").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn corrupt_entry_fails_fast_by_default() {
        let storage = MemoryStorage::new();
        storage.set_item("count", "{ broken").unwrap();

        let err = PersistedStore::new(storage.clone(), "count", 0).unwrap_err();
        assert!(matches!(err, Error::Deserialization { ref key, .. } if key == "count"));
        assert_eq!(storage.get_item("count").unwrap().as_deref(), Some("{ broken"));
    }

    #[test]
    fn corrupt_entry_can_be_reset() {
        let storage = MemoryStorage::new();
        storage.set_item("count", "\"not a number\"").unwrap();

        let store = PersistedStore::with_options(
            storage.clone(),
            "count",
            7,
            PersistOptions::default().on_corrupt(CorruptEntryPolicy::ResetToInitial),
        )
        .unwrap();

        assert_eq!(store.get(), 7);
        assert_eq!(storage.get_item("count").unwrap().as_deref(), Some("7"));
    }

    #[test]
    fn reload_picks_up_external_writes() {
        let storage = MemoryStorage::new();
        let store = PersistedStore::new(storage.clone(), "count", 1).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let _sub = {
            let seen = seen.clone();
            store.subscribe(move |n: &i32| seen.lock().unwrap().push(*n))
        };

        storage.set_item("count", "5").unwrap();
        store.reload().unwrap();
        assert_eq!(store.get(), 5);

        storage.remove_item("count").unwrap();
        store.reload().unwrap();
        assert_eq!(storage.get_item("count").unwrap().as_deref(), Some("5"));

        assert_eq!(*seen.lock().unwrap(), vec![1, 5]);
    }

    #[test]
    fn reload_reports_corrupt_entry() {
        let storage = MemoryStorage::new();
        let store = PersistedStore::new(storage.clone(), "count", 1).unwrap();

        storage.set_item("count", "oops").unwrap();
        assert!(matches!(store.reload(), Err(Error::Deserialization { .. })));
        assert_eq!(store.get(), 1);
    }

    #[test]
    fn concurrent_writers_leave_storage_and_memory_in_step() {
        let storage = MemoryStorage::new();
        let store = PersistedStore::new(storage.clone(), "count", 0).unwrap();

        let handles: Vec<_> = (1..=4)
            .map(|writer| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for n in 0..250 {
                        store.set(writer * 1000 + n).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stored: i32 = serde_json::from_str(&storage.get_item("count").unwrap().unwrap()).unwrap();
        assert_eq!(stored, store.get());
    }

    #[test]
    fn subscriber_may_write_back() {
        let storage = MemoryStorage::new();
        let count = PersistedStore::new(storage.clone(), "count", 0).unwrap();
        let _writer = {
            let count_clone = count.clone();
            count.subscribe(move |n| {
                if *n == 1 {
                    count_clone.set(2).unwrap();
                }
            })
        };
        let seen = Arc::new(Mutex::new(Vec::new()));
        let _reader = {
            let seen = seen.clone();
            count.subscribe(move |n: &i32| seen.lock().unwrap().push(*n))
        };

        count.set(1).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(count.get(), 2);
        assert_eq!(storage.get_item("count").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn clones_share_state() {
        let storage = MemoryStorage::new();
        let store = PersistedStore::new(storage, "count", 0).unwrap();
        let other = store.clone();

        other.set(3).unwrap();
        assert_eq!(store.get(), 3);
        assert_eq!(store.key(), "count");
    }
}
