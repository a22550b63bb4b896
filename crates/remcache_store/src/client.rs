// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The core trait for backing key-value stores.
//!
//! [`StoreClient`] mirrors the raw command set of the remote store. Replies keep the store's
//! conventions so the cache adapter can apply its own policy on top of them.

use crate::{InfoReport, LifecycleState, StoreError, StoreEvent, SubscriptionId};

/// A boxed listener for [`StoreEvent`]s.
pub type StoreListener = Box<dyn Fn(&StoreEvent) + Send + Sync>;

/// Trait for store client implementations.
///
/// A store client owns one connection and reports its own [`LifecycleState`]. Data commands
/// issued while the client is not started fail with a [`StoreError`]; callers that need a
/// stronger contract (such as `remcache::Cache`) check [`is_started`](Self::is_started)
/// before issuing them.
///
/// Lifecycle methods emit [`StoreEvent`]s to listeners registered through
/// [`observe`](Self::observe): `Start` once a connection opens, `Stop` once it closes and
/// `Error` for connection-level failures.
pub trait StoreClient: Send + Sync {
    /// Returns the current lifecycle state.
    fn state(&self) -> LifecycleState;

    /// Returns `true` while the connection is open.
    fn is_started(&self) -> bool {
        self.state().is_started()
    }

    /// Returns `true` while command delivery is deferred.
    fn is_paused(&self) -> bool {
        self.state().is_paused()
    }

    /// Opens the connection. Succeeds immediately if it is already open.
    fn start(&self) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Closes the connection without waiting for in-flight commands.
    fn stop(&self) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Refuses new commands, waits for in-flight commands to finish, then closes the connection.
    fn end(&self) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Closes the connection synchronously, abandoning in-flight commands.
    ///
    /// Used on drop paths where awaiting is not possible.
    fn terminate(&self);

    /// Defers command delivery. Returns `false` if the store was not started or already paused.
    fn pause(&self) -> bool;

    /// Resumes command delivery. Returns `false` if the store was not paused.
    fn resume(&self) -> bool;

    /// Returns the raw stored value, or `None` if the key is absent.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Stores a value without expiry and returns the store's acknowledgement (`"OK"` on success).
    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<String, StoreError>> + Send;

    /// Stores a value that expires after `seconds` and returns the store's acknowledgement.
    fn set_with_expiry(&self, key: &str, seconds: u64, value: String) -> impl Future<Output = Result<String, StoreError>> + Send;

    /// Deletes a key and returns the number of keys removed.
    fn delete(&self, key: &str) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Returns the number of the given keys that exist (0 or 1).
    fn exists(&self, key: &str) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Sets a key's expiry. Replies `1` if the key exists, `0` otherwise.
    fn expire(&self, key: &str, seconds: u64) -> impl Future<Output = Result<i64, StoreError>> + Send;

    /// Returns the key's remaining time to live in seconds.
    ///
    /// Replies `-2` if the key does not exist and `-1` if it exists without an expiry.
    fn ttl(&self, key: &str) -> impl Future<Output = Result<i64, StoreError>> + Send;

    /// Removes a key's expiry. Replies `1` if an expiry was removed, `0` otherwise.
    fn persist(&self, key: &str) -> impl Future<Output = Result<i64, StoreError>> + Send;

    /// Returns every key in the store, in no particular order.
    fn keys(&self) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Returns the store's diagnostic report.
    fn info(&self) -> impl Future<Output = Result<InfoReport, StoreError>> + Send;

    /// Removes every key from the store's database.
    fn flush_all(&self) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Registers a listener for lifecycle and error events.
    fn observe(&self, listener: StoreListener) -> SubscriptionId;

    /// Removes a listener. Returns `false` if it was not registered.
    fn unobserve(&self, id: SubscriptionId) -> bool;
}
