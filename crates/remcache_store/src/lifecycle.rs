// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Shared lifecycle bookkeeping for store clients.
//!
//! [`Lifecycle`] keeps the [`LifecycleState`] and the number of in-flight commands in two
//! watch channels, so waiting for "not paused" or "drained" needs no runtime of its own and
//! works under any executor.

use std::fmt;

use tokio::sync::watch;

use crate::{LifecycleState, Observers, StoreError, StoreEvent, SubscriptionId};

/// Lifecycle state, pause gate and in-flight tracking for a store client.
///
/// # Examples
///
/// ```
/// use remcache_store::{Lifecycle, LifecycleState};
/// # futures::executor::block_on(async {
///
/// let lifecycle = Lifecycle::new();
/// assert!(lifecycle.admit().await.is_err());
///
/// lifecycle.set_state(LifecycleState::Started);
/// let guard = lifecycle.admit().await?;
/// assert_eq!(lifecycle.in_flight(), 1);
/// drop(guard);
/// assert_eq!(lifecycle.in_flight(), 0);
/// # Ok::<(), remcache_store::StoreError>(())
/// # });
/// ```
pub struct Lifecycle {
    state: watch::Sender<LifecycleState>,
    in_flight: watch::Sender<usize>,
    observers: Observers<StoreEvent>,
}

impl Lifecycle {
    /// Creates a lifecycle in the [`Stopped`](LifecycleState::Stopped) state.
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(LifecycleState::Stopped);
        let (in_flight, _) = watch::channel(0);
        Self {
            state,
            in_flight,
            observers: Observers::new(),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Moves to `next` and returns the previous state.
    pub fn set_state(&self, next: LifecycleState) -> LifecycleState {
        self.state.send_replace(next)
    }

    /// Moves from `Started` to `Paused`. Returns `false` in any other state.
    pub fn pause(&self) -> bool {
        self.state.send_if_modified(|state| {
            let pausable = *state == LifecycleState::Started;
            if pausable {
                *state = LifecycleState::Paused;
            }
            pausable
        })
    }

    /// Moves from `Paused` to `Started`. Returns `false` in any other state.
    pub fn resume(&self) -> bool {
        self.state.send_if_modified(|state| {
            let paused = *state == LifecycleState::Paused;
            if paused {
                *state = LifecycleState::Started;
            }
            paused
        })
    }

    /// Admits one data command.
    ///
    /// The command is counted as in flight from the moment it is admitted, and waits here while
    /// the store is paused. Keep the returned guard alive until the reply has been received.
    ///
    /// # Errors
    ///
    /// Fails if the store is not started, or if it was hard-stopped while the command waited.
    pub async fn admit(&self) -> Result<InFlight<'_>, StoreError> {
        if !self.state().is_started() {
            return Err(StoreError::not_started());
        }

        self.in_flight.send_modify(|count| *count += 1);
        let guard = InFlight { counter: &self.in_flight };

        let mut state = self.state.subscribe();
        let current = *state
            .wait_for(|state| !state.is_paused())
            .await
            .map_err(|_closed| StoreError::closed())?;

        match current {
            LifecycleState::Started | LifecycleState::Ending => Ok(guard),
            _ => Err(StoreError::closed()),
        }
    }

    /// Waits until no admitted command is in flight.
    pub async fn drain(&self) {
        let mut in_flight = self.in_flight.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _drained = in_flight.wait_for(|count| *count == 0).await.is_ok();
    }

    /// Returns the number of admitted commands that have not finished.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        *self.in_flight.borrow()
    }

    /// Registers a listener for this store's events.
    pub fn observe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        self.observers.subscribe(listener)
    }

    /// Removes a listener registered with [`observe`](Self::observe).
    pub fn unobserve(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Notifies all listeners.
    pub fn emit(&self, event: &StoreEvent) {
        self.observers.notify(event);
    }

    /// Moves to `Stopped` and emits [`StoreEvent::Stop`] unless already stopped.
    ///
    /// Returns `true` if the store was not stopped before.
    pub fn close(&self) -> bool {
        let previous = self.set_state(LifecycleState::Stopped);
        let closed = previous != LifecycleState::Stopped;
        if closed {
            self.emit(&StoreEvent::Stop);
        }
        closed
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("state", &self.state())
            .field("in_flight", &self.in_flight())
            .field("observers", &self.observers)
            .finish()
    }
}

/// Marks one command as in flight until dropped.
#[must_use = "the command stops counting as in flight as soon as the guard is dropped"]
pub struct InFlight<'a> {
    counter: &'a watch::Sender<usize>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.counter.send_modify(|count| *count = count.saturating_sub(1));
    }
}

impl fmt::Debug for InFlight<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InFlight").finish_non_exhaustive()
    }
}
