//! Versioned state container with synchronous change notification.
//!
//! # Guarantees
//!
//! - **Versions only go up**: every `set_state` / `patch_state` bumps the
//!   version by exactly one. The version never resets while the container
//!   is alive.
//! - **Ordered delivery**: subscribers are called in registration order, and
//!   mutations are delivered in the order they happened.
//! - **Cycle isolation**: a subscriber registered while a notification is in
//!   flight is not called for that notification.
//!
//! Mutation and notification are serialized by a writer lock, so callbacks
//! must not mutate the container they are subscribed to.
//!
//! # Push streams
//!
//! [`StateContainer::watch`] turns the callback API into a [`Stream`] of full
//! snapshots: the current one first, then one per mutation. Dropping the
//! stream unsubscribes it. The stream ends when the container is destroyed.

use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::task::{Context, Poll};

use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

// =============================================================================
// Snapshot
// =============================================================================

/// An immutable `{value, version}` pair.
///
/// This is the wire shape shared by the pull (query) and push (stream)
/// channels. Since versions strictly increase, the higher version is always
/// the fresher view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<T> {
    /// Application-level state.
    pub value: T,
    /// Mutation counter, starting at 0.
    pub version: u64,
}

impl<T> Snapshot<T> {
    /// Initial snapshot (version 0).
    pub fn initial(value: T) -> Self {
        Self { value, version: 0 }
    }

    /// Check if this snapshot is strictly fresher than `other`.
    pub fn is_newer_than(&self, other: &Snapshot<T>) -> bool {
        self.version > other.version
    }
}

// =============================================================================
// State Container
// =============================================================================

type Callback<T> = Arc<dyn Fn(&Snapshot<T>) + Send + Sync>;

struct Subscribers<T> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

struct Shared<T> {
    snapshot: Mutex<Snapshot<T>>,
    subscribers: Mutex<Subscribers<T>>,
    /// Held across mutate + notify so deliveries keep mutation order.
    writer: Mutex<()>,
}

/// Removal hook so [`Subscription`] does not need to carry `T`.
trait SubscriberSet: Send + Sync {
    fn remove(&self, id: u64);
}

impl<T: Send> SubscriberSet for Shared<T> {
    fn remove(&self, id: u64) {
        lock(&self.subscribers).entries.retain(|(entry_id, _)| *entry_id != id);
    }
}

/// Holds a value plus a strictly increasing version, and notifies
/// subscribers on every change.
///
/// Cheap to clone: clones share the same state and subscribers.
///
/// # Example
///
/// ```ignore
/// let container = StateContainer::new(Counter { hits: 0 });
/// let sub = container.subscribe(|snapshot| {
///     println!("v{} -> {:?}", snapshot.version, snapshot.value);
/// });
///
/// container.patch_state(|c| c.hits += 1); // prints "v1 -> Counter { hits: 1 }"
/// sub.unsubscribe();
/// ```
pub struct StateContainer<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for StateContainer<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> StateContainer<T> {
    /// Create a container at version 0.
    pub fn new(initial: T) -> Self {
        Self {
            shared: Arc::new(Shared {
                snapshot: Mutex::new(Snapshot::initial(initial)),
                subscribers: Mutex::new(Subscribers {
                    next_id: 0,
                    entries: Vec::new(),
                }),
                writer: Mutex::new(()),
            }),
        }
    }

    /// Current snapshot. No side effects.
    pub fn get_state(&self) -> Snapshot<T> {
        lock(&self.shared.snapshot).clone()
    }

    /// Current version.
    pub fn version(&self) -> u64 {
        lock(&self.shared.snapshot).version
    }

    /// Replace the value, bump the version, and notify subscribers.
    pub fn set_state(&self, value: T) -> Snapshot<T> {
        self.mutate(move |current| *current = value)
    }

    /// Change part of the value in place, then behave like [`set_state`].
    ///
    /// [`set_state`]: StateContainer::set_state
    pub fn patch_state(&self, patch: impl FnOnce(&mut T)) -> Snapshot<T> {
        self.mutate(patch)
    }

    /// Like [`patch_state`], but only commits when `patch` returns `true`.
    ///
    /// The patch runs on a copy of the value, so a `false` return leaves
    /// the container untouched: no version bump and no notification.
    ///
    /// [`patch_state`]: StateContainer::patch_state
    pub fn patch_state_if(&self, patch: impl FnOnce(&mut T) -> bool) -> Option<Snapshot<T>> {
        let _writer = lock(&self.shared.writer);

        let snapshot = {
            let mut current = lock(&self.shared.snapshot);
            let mut value = current.value.clone();
            if !patch(&mut value) {
                return None;
            }
            current.value = value;
            current.version += 1;
            current.clone()
        };

        self.notify(&snapshot);
        Some(snapshot)
    }

    fn mutate(&self, apply: impl FnOnce(&mut T)) -> Snapshot<T> {
        let _writer = lock(&self.shared.writer);

        let snapshot = {
            let mut current = lock(&self.shared.snapshot);
            apply(&mut current.value);
            current.version += 1;
            current.clone()
        };

        self.notify(&snapshot);
        snapshot
    }

    /// Deliver to every subscriber. Caller holds the writer lock.
    fn notify(&self, snapshot: &Snapshot<T>) {
        // Copy the list so subscribers added during delivery wait for the next cycle
        let callbacks: Vec<Callback<T>> = lock(&self.shared.subscribers)
            .entries
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();

        for callback in callbacks {
            callback(snapshot);
        }
    }

    /// Register a callback for every future mutation.
    ///
    /// The callback is not called with the current snapshot. The returned
    /// [`Subscription`] does not unsubscribe on drop; call
    /// [`Subscription::unsubscribe`].
    ///
    /// Callbacks run synchronously on the mutating thread while deliveries
    /// for this container are serialized. Reading the container from a
    /// callback is fine. Mutating it from a callback deadlocks; spawn that
    /// work instead.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Snapshot<T>) + Send + Sync + 'static,
    {
        let id = {
            let mut subscribers = lock(&self.shared.subscribers);
            let id = subscribers.next_id;
            subscribers.next_id += 1;
            subscribers.entries.push((id, Arc::new(callback)));
            id
        };

        let shared: Arc<dyn SubscriberSet> = self.shared.clone();
        Subscription {
            id,
            shared: Arc::downgrade(&shared),
        }
    }

    /// Stream of snapshots: the current one, then one per mutation.
    ///
    /// Must not be called from inside a subscriber callback of the same
    /// container.
    pub fn watch(&self) -> SnapshotStream<T> {
        let (sender, receiver) = mpsc::unbounded_channel();

        // No mutation can slip between the initial snapshot and registration
        let _writer = lock(&self.shared.writer);
        let _ = sender.send(self.get_state());
        let subscription = self.subscribe(move |snapshot| {
            let _ = sender.send(snapshot.clone());
        });

        SnapshotStream {
            receiver,
            subscription,
        }
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.shared.subscribers).entries.len()
    }
}

impl<T: Clone + Send + std::fmt::Debug + 'static> std::fmt::Debug for StateContainer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateContainer")
            .field("snapshot", &self.get_state())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// =============================================================================
// Subscription
// =============================================================================

/// Handle returned by [`StateContainer::subscribe`].
pub struct Subscription {
    id: u64,
    shared: Weak<dyn SubscriberSet>,
}

impl Subscription {
    /// Stop receiving notifications. Calling it again is a no-op.
    pub fn unsubscribe(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.remove(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

// =============================================================================
// Snapshot Stream
// =============================================================================

/// Push channel over a [`StateContainer`], created by
/// [`watch`](StateContainer::watch).
///
/// Lazy, unbounded, not restartable. Unsubscribes on drop.
pub struct SnapshotStream<T> {
    receiver: mpsc::UnboundedReceiver<Snapshot<T>>,
    subscription: Subscription,
}

impl<T> Stream for SnapshotStream<T> {
    type Item = Snapshot<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}

impl<T> Drop for SnapshotStream<T> {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}

/// Lock a mutex, recovering the guard if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("mutex was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}
