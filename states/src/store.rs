//! Push-based store with explicit subscription tokens.
//!
//! A [`Store`] keeps its latest value and fans every new value out to its
//! subscribers through `flume` channels. Subscribers poll their [`Subscription`]
//! from the UI thread; nothing runs inside `set_state`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use flume::{Receiver, Sender};

use crate::Disposer;

struct StoreInner<T> {
    value: T,
    next_id: u64,
    subscribers: Vec<(u64, Sender<T>)>,
}

fn lock<T>(inner: &Mutex<StoreInner<T>>) -> MutexGuard<'_, StoreInner<T>> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

fn remove_subscriber<T>(store: &Weak<Mutex<StoreInner<T>>>, id: u64) {
    if let Some(inner) = store.upgrade() {
        lock(&inner).subscribers.retain(|(sub, _)| *sub != id);
    }
}

/// Shared handle to a store. Cloning shares the same value and subscribers.
pub struct Store<T> {
    inner: Arc<Mutex<StoreInner<T>>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Default + 'static> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("Store")
            .field("value", &inner.value)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + Send + 'static> Store<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                value: initial,
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// A clone of the current value.
    pub fn state(&self) -> T {
        lock(&self.inner).value.clone()
    }

    /// Replace the value and push it to every live subscriber.
    pub fn set_state(&self, value: T) {
        let mut inner = lock(&self.inner);
        inner.value = value;
        Self::publish(&mut inner);
    }

    /// Modify the value in place, then push it.
    ///
    /// `f` runs under the store lock, so a concurrent `set_state` lands either
    /// before or after it, never in between. `f` must not touch this store.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut inner = lock(&self.inner);
        f(&mut inner.value);
        Self::publish(&mut inner);
    }

    fn publish(inner: &mut StoreInner<T>) {
        let current = inner.value.clone();
        inner
            .subscribers
            .retain(|(_, send)| send.send(current.clone()).is_ok());
    }

    /// Subscribe to this store. The current value is delivered first.
    pub fn subscribe(&self) -> Subscription<T> {
        let (send, recv) = flume::unbounded();
        let mut inner = lock(&self.inner);

        let id = inner.next_id;
        inner.next_id += 1;
        // The receiver is alive here, sending cannot fail.
        let _ignored = send.send(inner.value.clone());
        inner.subscribers.push((id, send));

        Subscription {
            id,
            recv,
            store: Arc::downgrade(&self.inner),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).subscribers.len()
    }
}

/// Receiving end of a store subscription.
///
/// Dropping it unsubscribes. [`Subscription::disposer`] hands out a detached
/// unsubscribe token for registration in a [`crate::DisposerScope`].
pub struct Subscription<T> {
    id: u64,
    recv: Receiver<T>,
    store: Weak<Mutex<StoreInner<T>>>,
}

impl<T: Send + 'static> Subscription<T> {
    /// Next pending value, if any.
    pub fn try_next(&self) -> Option<T> {
        self.recv.try_recv().ok()
    }

    /// Every pending value, in delivery order.
    pub fn drain(&self) -> Vec<T> {
        self.recv.try_iter().collect()
    }

    pub fn unsubscribe(&self) {
        remove_subscriber(&self.store, self.id);
    }

    pub fn disposer(&self) -> Disposer {
        let store = self.store.clone();
        let id = self.id;
        Disposer::new(move || remove_subscriber(&store, id))
    }

    /// `false` once the subscription was released or the store is gone.
    pub fn is_active(&self) -> bool {
        self.store
            .upgrade()
            .is_some_and(|inner| lock(&inner).subscribers.iter().any(|(id, _)| *id == self.id))
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        remove_subscriber(&self.store, self.id);
    }
}
