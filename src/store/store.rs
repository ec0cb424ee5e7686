use super::Subscription;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

type Subscriber<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Subscribers<T> {
    next_id: AtomicUsize,
    entries: RwLock<Vec<(usize, Subscriber<T>)>>,
    queue: Mutex<Delivery<T>>,
}

/// Pending notifications, delivered in the order the writes were applied.
struct Delivery<T> {
    pending: VecDeque<(Subscriber<T>, T)>,
    draining: bool,
}

/// Clears the draining flag even if a subscriber panics.
struct DrainGuard<'a, T> {
    queue: &'a Mutex<Delivery<T>>,
}

impl<T> Drop for DrainGuard<'_, T> {
    fn drop(&mut self) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.draining = false;
            if std::thread::panicking() {
                queue.pending.clear();
            }
        }
    }
}

/// Read access shared by every observable value container in this crate.
pub trait Readable<T> {
    /// Get a clone of the current value.
    fn get(&self) -> T;

    /// Register a listener.
    ///
    /// The listener is called once immediately with the current value and
    /// again after every change, in the order the changes were applied.
    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static;
}

/// A thread-safe observable value.
///
/// Every `set` or `update` notifies all active subscribers, in the order they
/// subscribed. No lock is held while subscribers run, so a subscriber may read
/// or write the store it is subscribed to. A write made while subscribers are
/// being notified is queued and delivered after the current round, so every
/// subscriber sees the values in the order they were applied. Queued rounds
/// are delivered by whichever call started the outermost notification.
pub struct Store<T> {
    state: Arc<RwLock<T>>,
    subscribers: Arc<Subscribers<T>>,
}

impl<T: Clone + Send + Sync + 'static> Store<T> {
    /// Create a new store with the given initial state.
    pub fn new(initial: T) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial)),
            subscribers: Arc::new(Subscribers {
                next_id: AtomicUsize::new(0),
                entries: RwLock::new(Vec::new()),
                queue: Mutex::new(Delivery {
                    pending: VecDeque::new(),
                    draining: false,
                }),
            }),
        }
    }

    /// Get a clone of the current state.
    pub fn get(&self) -> T {
        self.state.read().unwrap().clone()
    }

    /// Apply `f` to a copy of the current state and [`set`](Self::set) the
    /// result.
    ///
    /// No lock is held while `f` runs, so it may read the store.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        let mut next = self.get();
        f(&mut next);
        self.set(next);
    }

    /// Set a new state value.
    pub fn set(&self, new_state: T) {
        self.stage(new_state);
        self.drain();
    }

    /// Subscribe to state changes.
    ///
    /// The callback runs right away with the current state, then after every
    /// update until the returned [`Subscription`] is released.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.subscribers.next_id.fetch_add(1, Ordering::SeqCst);
        let callback: Subscriber<T> = Arc::new(callback);
        self.subscribers
            .entries
            .write()
            .unwrap()
            .push((id, Arc::clone(&callback)));

        let current = self.get();
        callback(&current);

        let subscribers: Weak<Subscribers<T>> = Arc::downgrade(&self.subscribers);
        Subscription::new(move || {
            if let Some(subscribers) = subscribers.upgrade() {
                if let Ok(mut entries) = subscribers.entries.write() {
                    entries.retain(|(entry_id, _)| *entry_id != id);
                }
            }
        })
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.entries.read().unwrap().len()
    }

    /// Make `new_state` current and queue a notification for every subscriber,
    /// without delivering it.
    pub(crate) fn stage(&self, new_state: T) {
        // The state lock is held while queueing so queue order matches write order.
        let mut state = self.state.write().unwrap();
        *state = new_state;
        let entries = self.subscribers.entries.read().unwrap();
        let mut queue = self.subscribers.queue.lock().unwrap();
        for (_, subscriber) in entries.iter() {
            queue
                .pending
                .push_back((Arc::clone(subscriber), state.clone()));
        }
    }

    /// Deliver queued notifications, unless a delivery is already under way.
    pub(crate) fn drain(&self) {
        let queue = &self.subscribers.queue;
        {
            let mut queue = queue.lock().unwrap();
            if queue.draining {
                return;
            }
            queue.draining = true;
        }
        let _guard = DrainGuard { queue };

        loop {
            let next = queue.lock().unwrap().pending.pop_front();
            match next {
                Some((subscriber, value)) => subscriber(&value),
                None => break,
            }
        }
    }

    /// Read state without cloning it.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        let state = self.state.read().unwrap();
        f(&*state)
    }
}

impl<T: Clone + Send + Sync + 'static> Readable<T> for Store<T> {
    fn get(&self) -> T {
        Store::get(self)
    }

    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Store::subscribe(self, listener)
    }
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("Store");
        match self.state.read() {
            Ok(state) => debug.field("state", &*state),
            Err(_) => debug.field("state", &"<poisoned>"),
        };
        debug.finish_non_exhaustive()
    }
}
