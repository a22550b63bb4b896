// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Recording store wrapper for testing.
//!
//! This module provides `MockStore`, which wraps any [`StoreClient`], records every data
//! command that reaches it and supports failure injection for testing error paths.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{InfoReport, LifecycleState, StoreClient, StoreError, StoreListener, SubscriptionId};

/// Recorded store command with full context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// A `get` for the given key.
    Get(String),
    /// A `set` without expiry.
    Set {
        /// The key that was written.
        key: String,
        /// The encoded value.
        value: String,
    },
    /// A `set_with_expiry`.
    SetWithExpiry {
        /// The key that was written.
        key: String,
        /// The expiry in whole seconds.
        seconds: u64,
        /// The encoded value.
        value: String,
    },
    /// A `delete` for the given key.
    Delete(String),
    /// An `exists` for the given key.
    Exists(String),
    /// An `expire` for the given key.
    Expire {
        /// The key whose expiry was set.
        key: String,
        /// The expiry in whole seconds.
        seconds: u64,
    },
    /// A `ttl` for the given key.
    Ttl(String),
    /// A `persist` for the given key.
    Persist(String),
    /// A `keys` listing.
    Keys,
    /// An `info` report.
    Info,
    /// A `flush_all`.
    FlushAll,
}

type FailPredicate = Box<dyn Fn(&StoreOp) -> bool + Send + Sync>;

/// A store wrapper that records commands and injects failures.
///
/// Lifecycle calls are forwarded unrecorded; data commands are recorded in the order they
/// arrive and then forwarded unless a failure or reply override applies.
///
/// # Examples
///
/// ```no_run
/// use remcache_store::testing::{MockStore, StoreOp};
/// use remcache_store::StoreClient;
///
/// # async fn example(inner: impl StoreClient) {
/// let store = MockStore::new(inner);
/// store.fail_when(|op| matches!(op, StoreOp::Get(key) if key == "forbidden"));
///
/// assert!(store.get("forbidden").await.is_err());
/// assert_eq!(store.operations(), vec![StoreOp::Get("forbidden".to_string())]);
/// # }
/// ```
pub struct MockStore<S> {
    inner: S,
    operations: Arc<Mutex<Vec<StoreOp>>>,
    fail_when: Arc<Mutex<Option<FailPredicate>>>,
    set_reply: Arc<Mutex<Option<String>>>,
}

impl<S> std::fmt::Debug for MockStore<S>
where
    S: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockStore")
            .field("inner", &self.inner)
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .field("set_reply", &self.set_reply)
            .finish()
    }
}

impl<S> MockStore<S> {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            operations: Arc::new(Mutex::new(Vec::new())),
            fail_when: Arc::new(Mutex::new(None)),
            set_reply: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the wrapped store.
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Sets a predicate that determines which commands fail.
    ///
    /// A failing command is still recorded but never reaches the wrapped store.
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&StoreOp) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Clears the failure predicate.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Makes `set` and `set_with_expiry` reply with `reply` instead of writing.
    pub fn reply_set_with(&self, reply: impl Into<String>) {
        *self.set_reply.lock() = Some(reply.into());
    }

    /// Returns a clone of all recorded commands.
    #[must_use]
    pub fn operations(&self) -> Vec<StoreOp> {
        self.operations.lock().clone()
    }

    /// Clears all recorded commands.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    fn record(&self, op: StoreOp) -> Result<(), StoreError> {
        let fail = self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(&op));
        let message = format!("mock: {op:?} failed");
        self.operations.lock().push(op);
        if fail { Err(StoreError::from_message(message)) } else { Ok(()) }
    }

    fn overridden_set_reply(&self) -> Option<String> {
        self.set_reply.lock().clone()
    }
}

impl<S> StoreClient for MockStore<S>
where
    S: StoreClient,
{
    fn state(&self) -> LifecycleState {
        self.inner.state()
    }

    async fn start(&self) -> Result<(), StoreError> {
        self.inner.start().await
    }

    async fn stop(&self) -> Result<(), StoreError> {
        self.inner.stop().await
    }

    async fn end(&self) -> Result<(), StoreError> {
        self.inner.end().await
    }

    fn terminate(&self) {
        self.inner.terminate();
    }

    fn pause(&self) -> bool {
        self.inner.pause()
    }

    fn resume(&self) -> bool {
        self.inner.resume()
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.record(StoreOp::Get(key.to_string()))?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<String, StoreError> {
        self.record(StoreOp::Set {
            key: key.to_string(),
            value: value.clone(),
        })?;
        match self.overridden_set_reply() {
            Some(reply) => Ok(reply),
            None => self.inner.set(key, value).await,
        }
    }

    async fn set_with_expiry(&self, key: &str, seconds: u64, value: String) -> Result<String, StoreError> {
        self.record(StoreOp::SetWithExpiry {
            key: key.to_string(),
            seconds,
            value: value.clone(),
        })?;
        match self.overridden_set_reply() {
            Some(reply) => Ok(reply),
            None => self.inner.set_with_expiry(key, seconds, value).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<u64, StoreError> {
        self.record(StoreOp::Delete(key.to_string()))?;
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> Result<u64, StoreError> {
        self.record(StoreOp::Exists(key.to_string()))?;
        self.inner.exists(key).await
    }

    async fn expire(&self, key: &str, seconds: u64) -> Result<i64, StoreError> {
        self.record(StoreOp::Expire {
            key: key.to_string(),
            seconds,
        })?;
        self.inner.expire(key, seconds).await
    }

    async fn ttl(&self, key: &str) -> Result<i64, StoreError> {
        self.record(StoreOp::Ttl(key.to_string()))?;
        self.inner.ttl(key).await
    }

    async fn persist(&self, key: &str) -> Result<i64, StoreError> {
        self.record(StoreOp::Persist(key.to_string()))?;
        self.inner.persist(key).await
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.record(StoreOp::Keys)?;
        self.inner.keys().await
    }

    async fn info(&self) -> Result<InfoReport, StoreError> {
        self.record(StoreOp::Info)?;
        self.inner.info().await
    }

    async fn flush_all(&self) -> Result<(), StoreError> {
        self.record(StoreOp::FlushAll)?;
        self.inner.flush_all().await
    }

    fn observe(&self, listener: StoreListener) -> SubscriptionId {
        self.inner.observe(listener)
    }

    fn unobserve(&self, id: SubscriptionId) -> bool {
        self.inner.unobserve(id)
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;
    use crate::{Lifecycle, OK_REPLY};

    /// A store that accepts everything and remembers nothing.
    #[derive(Debug, Default)]
    struct NullStore {
        lifecycle: Lifecycle,
    }

    impl StoreClient for NullStore {
        fn state(&self) -> LifecycleState {
            self.lifecycle.state()
        }

        async fn start(&self) -> Result<(), StoreError> {
            let _previous = self.lifecycle.set_state(LifecycleState::Started);
            Ok(())
        }

        async fn stop(&self) -> Result<(), StoreError> {
            let _closed = self.lifecycle.close();
            Ok(())
        }

        async fn end(&self) -> Result<(), StoreError> {
            self.stop().await
        }

        fn terminate(&self) {
            let _closed = self.lifecycle.close();
        }

        fn pause(&self) -> bool {
            self.lifecycle.pause()
        }

        fn resume(&self) -> bool {
            self.lifecycle.resume()
        }

        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: String) -> Result<String, StoreError> {
            Ok(OK_REPLY.to_string())
        }

        async fn set_with_expiry(&self, _key: &str, _seconds: u64, _value: String) -> Result<String, StoreError> {
            Ok(OK_REPLY.to_string())
        }

        async fn delete(&self, _key: &str) -> Result<u64, StoreError> {
            Ok(0)
        }

        async fn exists(&self, _key: &str) -> Result<u64, StoreError> {
            Ok(0)
        }

        async fn expire(&self, _key: &str, _seconds: u64) -> Result<i64, StoreError> {
            Ok(0)
        }

        async fn ttl(&self, _key: &str) -> Result<i64, StoreError> {
            Ok(-2)
        }

        async fn persist(&self, _key: &str) -> Result<i64, StoreError> {
            Ok(0)
        }

        async fn keys(&self) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }

        async fn info(&self) -> Result<InfoReport, StoreError> {
            Ok(InfoReport::new())
        }

        async fn flush_all(&self) -> Result<(), StoreError> {
            Ok(())
        }

        fn observe(&self, listener: StoreListener) -> SubscriptionId {
            self.lifecycle.observe(listener)
        }

        fn unobserve(&self, id: SubscriptionId) -> bool {
            self.lifecycle.unobserve(id)
        }
    }

    #[test]
    fn records_commands_in_order() {
        let store = MockStore::new(NullStore::default());
        block_on(async {
            let _value = store.get("a").await.unwrap();
            let _reply = store.set_with_expiry("b", 5, "1".to_string()).await.unwrap();
            let _keys = store.keys().await.unwrap();
        });

        assert_eq!(
            store.operations(),
            vec![
                StoreOp::Get("a".to_string()),
                StoreOp::SetWithExpiry {
                    key: "b".to_string(),
                    seconds: 5,
                    value: "1".to_string(),
                },
                StoreOp::Keys,
            ]
        );
    }

    #[test]
    fn failing_commands_are_recorded_and_not_forwarded() {
        let store = MockStore::new(NullStore::default());
        store.fail_when(|op| matches!(op, StoreOp::Delete(_)));

        let result = block_on(store.delete("gone"));

        assert!(result.is_err());
        assert_eq!(store.operations(), vec![StoreOp::Delete("gone".to_string())]);

        store.clear_failures();
        assert!(block_on(store.delete("gone")).is_ok());
    }

    #[test]
    fn set_reply_override() {
        let store = MockStore::new(NullStore::default());
        store.reply_set_with("QUEUED");

        assert_eq!(block_on(store.set("k", "v".to_string())).unwrap(), "QUEUED");
        assert_eq!(block_on(store.set_with_expiry("k", 1, "v".to_string())).unwrap(), "QUEUED");
    }

    #[test]
    fn lifecycle_is_forwarded_unrecorded() {
        let store = MockStore::new(NullStore::default());
        block_on(store.start()).unwrap();
        assert!(store.is_started());
        assert!(store.pause());
        assert!(store.is_paused());
        assert!(store.resume());
        block_on(store.stop()).unwrap();

        assert_eq!(store.state(), LifecycleState::Stopped);
        assert!(store.operations().is_empty());
    }

    #[test]
    fn clear_operations_empties_log() {
        let store = MockStore::new(NullStore::default());
        let _info = block_on(store.info()).unwrap();
        store.clear_operations();
        assert!(store.operations().is_empty());
    }
}
