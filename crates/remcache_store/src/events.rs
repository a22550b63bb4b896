// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Typed observer registry and the events store clients emit.

use std::{fmt, sync::Arc};

use parking_lot::Mutex;

use crate::StoreError;

/// A lifecycle or error notification emitted by a store client.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// The store finished starting and accepts commands.
    Start,
    /// The store closed its connection, gracefully or not.
    Stop,
    /// The store hit a connection-level failure.
    Error(StoreError),
}

/// Identifies a listener registered with [`Observers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Registry<E> {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener<E>)>,
}

/// A clonable registry of listeners for events of type `E`.
///
/// Clones share the same listener list, so a clone handed to a background task notifies the
/// listeners registered through the original. Listeners run outside the registry lock and may
/// subscribe or unsubscribe from inside a notification.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// use remcache_store::{Observers, StoreEvent};
///
/// let observers = Observers::<StoreEvent>::new();
/// let starts = Arc::new(AtomicUsize::new(0));
///
/// let counter = Arc::clone(&starts);
/// let id = observers.subscribe(move |event| {
///     if matches!(event, StoreEvent::Start) {
///         counter.fetch_add(1, Ordering::SeqCst);
///     }
/// });
///
/// observers.notify(&StoreEvent::Start);
/// assert!(observers.unsubscribe(id));
/// observers.notify(&StoreEvent::Start);
///
/// assert_eq!(starts.load(Ordering::SeqCst), 1);
/// ```
pub struct Observers<E> {
    registry: Arc<Mutex<Registry<E>>>,
}

impl<E> Observers<E> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Registers a listener and returns the id to remove it with.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if the id was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.registry.lock();
        let before = registry.listeners.len();
        registry.listeners.retain(|(existing, _)| *existing != id);
        registry.listeners.len() != before
    }

    /// Calls every registered listener with `event`, in subscription order.
    pub fn notify(&self, event: &E) {
        let listeners: Vec<Listener<E>> = self
            .registry
            .lock()
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(event);
        }
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.lock().listeners.len()
    }

    /// Returns `true` if no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for Observers<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<E> fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers").field("listeners", &self.len()).finish()
    }
}
