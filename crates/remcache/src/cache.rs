// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The cache adapter over a store client.

use std::{fmt, sync::Arc, time::Duration};

use remcache_store::{OK_REPLY, Observers, StoreClient, StoreError, StoreEvent, SubscriptionId};
use serde::Serialize;
use serde_json::Value;
use tick::Clock;

use crate::{
    CacheEvent, CacheStats, ReadError, ReadErrorKind, WriteError, WriteErrorKind,
    builder::CacheBuilder,
    codec, stats,
    telemetry::{
        CacheActivity, CacheOperation, CacheTelemetry,
        ext::{CacheTelemetryExt, ClockExt},
    },
    ttl,
};

/// Type alias for cache names used in events and telemetry.
pub type CacheName = &'static str;

/// The store database the adapter reads statistics for.
const DB_INDEX: u32 = 0;

/// Cache semantics over a remote key-value store with an explicit connection lifecycle.
///
/// A `Cache` owns exactly one [`StoreClient`]. Every data operation checks that the store is
/// started before issuing a command; on a stopped cache it fails with a `NotStarted` error
/// and the store is never contacted.
///
/// Lifecycle transitions take `&mut self`, so a transition cannot race another transition or
/// an in-flight operation on the same cache.
///
/// Values are JSON values ([`Value`]). Reads of an absent key yield [`Value::Null`].
///
/// Dropping a cache that is still open closes the store without waiting for in-flight commands.
/// Prefer [`end`](Self::end) for a graceful shutdown.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use remcache::{Cache, Value};
/// use tick::Clock;
/// # futures::executor::block_on(async {
///
/// let mut cache = Cache::builder(Clock::new_frozen()).memory().build();
/// cache.start().await?;
///
/// cache.set("greeting", "hello", Duration::ZERO).await?;
/// assert_eq!(cache.get("greeting").await?, Value::from("hello"));
///
/// cache.end().await?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # }).unwrap();
/// ```
pub struct Cache<S = ()> {
    name: CacheName,
    store: Arc<S>,
    clock: Clock,
    observers: Observers<CacheEvent>,
    telemetry: Option<CacheTelemetry>,
    _release: Release,
}

impl Cache<()> {
    /// Creates a cache builder using `clock` as the time source.
    ///
    /// # Examples
    ///
    /// ```
    /// use remcache::Cache;
    /// use tick::Clock;
    ///
    /// let cache = Cache::builder(Clock::new_frozen()).memory().build();
    /// assert!(!cache.is_started());
    /// ```
    #[must_use]
    pub fn builder(clock: Clock) -> CacheBuilder {
        CacheBuilder::new(clock)
    }
}

/// Construction and accessors.
impl<S> Cache<S>
where
    S: StoreClient + 'static,
{
    pub(crate) fn new(name: CacheName, store: S, clock: Clock, telemetry: Option<CacheTelemetry>) -> Self {
        let store = Arc::new(store);
        let observers = Observers::new();

        let forward = observers.clone();
        let subscription = store.observe(Box::new(move |event: &StoreEvent| forward.notify(&CacheEvent::from_store(name, event))));

        let owned = Arc::clone(&store);
        let release = Release(Some(Box::new(move || {
            owned.terminate();
            let _removed = owned.unobserve(subscription);
        })));

        Self {
            name,
            store,
            clock,
            observers,
            telemetry,
            _release: release,
        }
    }
}

impl<S> Cache<S> {
    /// Returns the name of this cache.
    #[must_use]
    pub fn name(&self) -> CacheName {
        self.name
    }

    /// Returns the store client for inspection.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the cache's clock.
    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Registers a listener for the cache's lifecycle and error events.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&CacheEvent) + Send + Sync + 'static,
    {
        self.observers.subscribe(listener)
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}

/// Lifecycle.
impl<S> Cache<S>
where
    S: StoreClient,
{
    /// Returns `true` while the store connection is open, paused or not.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.store.is_started()
    }

    /// Returns `true` while the store defers command delivery.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.store.is_paused()
    }

    /// Opens the store connection. Succeeds immediately on a started cache.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the connection cannot be opened. The failure is also
    /// published as [`CacheEvent::Error`].
    pub async fn start(&mut self) -> Result<&mut Self, StoreError> {
        self.transition(CacheOperation::Start, CacheActivity::Started, self.store.start())
            .await?;
        Ok(self)
    }

    /// Closes the store connection without waiting for in-flight operations.
    ///
    /// # Errors
    ///
    /// Returns the store's error if closing failed.
    pub async fn stop(&mut self) -> Result<&mut Self, StoreError> {
        self.transition(CacheOperation::Stop, CacheActivity::Stopped, self.store.stop())
            .await?;
        Ok(self)
    }

    /// Refuses new operations, lets in-flight ones finish, then closes the store connection.
    ///
    /// # Errors
    ///
    /// Returns the store's error if closing failed.
    pub async fn end(&mut self) -> Result<&mut Self, StoreError> {
        self.transition(CacheOperation::End, CacheActivity::Stopped, self.store.end())
            .await?;
        Ok(self)
    }

    /// Defers command delivery. Returns `false` if the cache is not started or already paused.
    pub fn pause(&self) -> bool {
        self.store.pause()
    }

    /// Resumes command delivery. Returns `false` if the cache was not paused.
    pub fn resume(&self) -> bool {
        self.store.resume()
    }

    async fn transition(
        &self,
        operation: CacheOperation,
        done: CacheActivity,
        step: impl Future<Output = Result<(), StoreError>>,
    ) -> Result<(), StoreError> {
        let timed = self.clock.timed_async(step).await;
        let activity = if timed.result.is_ok() { done } else { CacheActivity::Error };
        self.telemetry.record(self.name, operation, activity, timed.duration);
        timed.result
    }
}

/// Data operations.
impl<S> Cache<S>
where
    S: StoreClient,
{
    /// Stores `value` under `key`.
    ///
    /// `ttl` is rounded to the nearest whole second; a positive TTL is never rounded below one
    /// second. A zero TTL stores the value without expiry. Returns the stored value.
    ///
    /// # Errors
    ///
    /// Fails with [`WriteErrorKind::NotStarted`] on a stopped cache,
    /// [`WriteErrorKind::NotAcknowledged`] if the store did not acknowledge the write and
    /// [`WriteErrorKind::Store`] if the command failed.
    pub async fn set(&self, key: &str, value: impl Into<Value>, ttl: Duration) -> Result<Value, WriteError> {
        self.write_guard(CacheOperation::Set)?;
        self.store_value(key, value.into(), ttl).await
    }

    /// Stores any serializable value under `key`.
    ///
    /// The value is converted to a [`Value`] before the cache state is checked, so an
    /// unsupported value is always reported as such.
    ///
    /// # Errors
    ///
    /// Fails with [`WriteErrorKind::UnsupportedValue`] if `value` has no JSON representation
    /// (a map with non-string keys, for example), otherwise as [`set`](Self::set).
    pub async fn set_serialized<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<Value, WriteError>
    where
        T: Serialize + ?Sized,
    {
        let value = codec::validate(value).map_err(|e| {
            self.telemetry.record_rejected(self.name, CacheOperation::Set);
            WriteError::caused_by(WriteErrorKind::UnsupportedValue, e)
        })?;
        self.write_guard(CacheOperation::Set)?;
        self.store_value(key, value, ttl).await
    }

    /// Returns the value stored under `key`, or [`Value::Null`] if it is absent.
    ///
    /// # Errors
    ///
    /// Fails with [`ReadErrorKind::NotStarted`] on a stopped cache,
    /// [`ReadErrorKind::Decode`] if the stored text is not JSON and [`ReadErrorKind::Store`]
    /// if the command failed.
    pub async fn get(&self, key: &str) -> Result<Value, ReadError> {
        let op = CacheOperation::Get;
        self.read_guard(op)?;
        let timed = self.clock.timed_async(self.store.get(key)).await;
        let raw = timed.result.map_err(|e| self.read_failed(op, timed.duration, e))?;

        let value = codec::decode(raw.as_deref()).map_err(|e| {
            self.telemetry.record(self.name, op, CacheActivity::Error, timed.duration);
            ReadError::caused_by(ReadErrorKind::Decode, e)
        })?;

        let activity = if raw.is_some() { CacheActivity::Hit } else { CacheActivity::Miss };
        self.telemetry.record(self.name, op, activity, timed.duration);
        Ok(value)
    }

    /// Deletes `key`. Returns `true` if a key was deleted.
    ///
    /// # Errors
    ///
    /// Fails with [`WriteErrorKind::NotStarted`] on a stopped cache and
    /// [`WriteErrorKind::Store`] if the command failed.
    pub async fn remove(&self, key: &str) -> Result<bool, WriteError> {
        let op = CacheOperation::Remove;
        self.write_guard(op)?;
        let timed = self.clock.timed_async(self.store.delete(key)).await;
        let removed = timed.result.map_err(|e| self.write_failed(op, timed.duration, e))? > 0;

        let activity = if removed { CacheActivity::Removed } else { CacheActivity::Ok };
        self.telemetry.record(self.name, op, activity, timed.duration);
        Ok(removed)
    }

    /// Returns `true` if `key` is present.
    ///
    /// # Errors
    ///
    /// Fails with [`ReadErrorKind::NotStarted`] on a stopped cache and [`ReadErrorKind::Store`]
    /// if the command failed.
    pub async fn exists(&self, key: &str) -> Result<bool, ReadError> {
        let op = CacheOperation::Exists;
        self.read_guard(op)?;
        let timed = self.clock.timed_async(self.store.exists(key)).await;
        let exists = timed.result.map_err(|e| self.read_failed(op, timed.duration, e))? > 0;

        let activity = if exists { CacheActivity::Hit } else { CacheActivity::Miss };
        self.telemetry.record(self.name, op, activity, timed.duration);
        Ok(exists)
    }

    /// Sets the expiry of an existing key and returns the applied TTL in whole seconds.
    ///
    /// # Errors
    ///
    /// Fails with [`WriteErrorKind::InvalidTtl`] for a zero TTL, checked before the cache
    /// state. Otherwise fails with [`WriteErrorKind::NotStarted`] on a stopped cache,
    /// [`WriteErrorKind::UndefinedKey`] if the key does not exist and
    /// [`WriteErrorKind::Store`] if the command failed.
    pub async fn set_ttl(&self, key: &str, ttl: Duration) -> Result<Duration, WriteError> {
        let op = CacheOperation::SetTtl;
        let seconds = ttl::whole_seconds(ttl);
        if seconds == 0 {
            self.telemetry.record_rejected(self.name, op);
            return Err(WriteError::new(WriteErrorKind::InvalidTtl));
        }

        self.write_guard(op)?;
        let timed = self.clock.timed_async(self.store.expire(key, seconds)).await;
        let applied = timed.result.map_err(|e| self.write_failed(op, timed.duration, e))? == 1;

        if !applied {
            self.telemetry.record(self.name, op, CacheActivity::Miss, timed.duration);
            return Err(WriteError::new(WriteErrorKind::UndefinedKey));
        }

        self.telemetry.record(self.name, op, CacheActivity::Stored, timed.duration);
        Ok(Duration::from_secs(seconds))
    }

    /// Returns the whole seconds `key` has left to live.
    ///
    /// Zero if the key has no expiry or does not exist; the two cases are not told apart.
    ///
    /// # Errors
    ///
    /// Fails with [`ReadErrorKind::NotStarted`] on a stopped cache and [`ReadErrorKind::Store`]
    /// if the command failed.
    pub async fn get_ttl(&self, key: &str) -> Result<Duration, ReadError> {
        let op = CacheOperation::GetTtl;
        self.read_guard(op)?;
        let timed = self.clock.timed_async(self.store.ttl(key)).await;
        let raw = timed.result.map_err(|e| self.read_failed(op, timed.duration, e))?;

        self.telemetry.record(self.name, op, CacheActivity::Ok, timed.duration);
        Ok(ttl::remaining(raw))
    }

    /// Removes the expiry of `key`. Returns `true` if an expiry was removed.
    ///
    /// # Errors
    ///
    /// Fails with [`WriteErrorKind::NotStarted`] on a stopped cache and
    /// [`WriteErrorKind::Store`] if the command failed.
    pub async fn remove_ttl(&self, key: &str) -> Result<bool, WriteError> {
        let op = CacheOperation::RemoveTtl;
        self.write_guard(op)?;
        let timed = self.clock.timed_async(self.store.persist(key)).await;
        let removed = timed.result.map_err(|e| self.write_failed(op, timed.duration, e))? == 1;

        let activity = if removed { CacheActivity::Removed } else { CacheActivity::Ok };
        self.telemetry.record(self.name, op, activity, timed.duration);
        Ok(removed)
    }

    /// Returns `true` if `key` exists and has an expiry.
    ///
    /// # Errors
    ///
    /// Fails with [`ReadErrorKind::NotStarted`] on a stopped cache and [`ReadErrorKind::Store`]
    /// if the command failed.
    pub async fn exists_ttl(&self, key: &str) -> Result<bool, ReadError> {
        let op = CacheOperation::ExistsTtl;
        self.read_guard(op)?;
        let timed = self.clock.timed_async(self.store.ttl(key)).await;
        let expiring = ttl::is_expiring(timed.result.map_err(|e| self.read_failed(op, timed.duration, e))?);

        let activity = if expiring { CacheActivity::Hit } else { CacheActivity::Miss };
        self.telemetry.record(self.name, op, activity, timed.duration);
        Ok(expiring)
    }

    /// Returns every key in the store, sorted.
    ///
    /// # Errors
    ///
    /// Fails with [`ReadErrorKind::NotStarted`] on a stopped cache and [`ReadErrorKind::Store`]
    /// if the command failed.
    pub async fn get_keys(&self) -> Result<Vec<String>, ReadError> {
        let op = CacheOperation::GetKeys;
        self.read_guard(op)?;
        let timed = self.clock.timed_async(self.store.keys()).await;
        let mut keys = timed.result.map_err(|e| self.read_failed(op, timed.duration, e))?;
        keys.sort_unstable();

        self.telemetry.record(self.name, op, CacheActivity::Ok, timed.duration);
        Ok(keys)
    }

    /// Reads a fresh usage snapshot of the store's database.
    ///
    /// # Errors
    ///
    /// Fails with [`ReadErrorKind::NotStarted`] on a stopped cache and [`ReadErrorKind::Store`]
    /// if the command failed.
    pub async fn get_stats(&self) -> Result<CacheStats, ReadError> {
        let op = CacheOperation::GetStats;
        self.read_guard(op)?;
        let timed = self.clock.timed_async(self.store.info()).await;
        let report = timed.result.map_err(|e| self.read_failed(op, timed.duration, e))?;
        let stats = stats::parse(&report, DB_INDEX);

        self.telemetry.record(self.name, op, CacheActivity::Ok, timed.duration);
        self.telemetry.record_keys(self.name, stats.keys);
        Ok(stats)
    }

    /// Removes every key from the store's database.
    ///
    /// # Errors
    ///
    /// Fails with [`WriteErrorKind::NotStarted`] on a stopped cache and
    /// [`WriteErrorKind::Store`] if the command failed.
    pub async fn flush(&self) -> Result<(), WriteError> {
        let op = CacheOperation::Flush;
        self.write_guard(op)?;
        let timed = self.clock.timed_async(self.store.flush_all()).await;
        timed.result.map_err(|e| self.write_failed(op, timed.duration, e))?;

        self.telemetry.record(self.name, op, CacheActivity::Removed, timed.duration);
        Ok(())
    }

    async fn store_value(&self, key: &str, value: Value, ttl: Duration) -> Result<Value, WriteError> {
        let op = CacheOperation::Set;
        let encoded = codec::encode(&value);
        let seconds = ttl::whole_seconds(ttl);

        let timed = if seconds == 0 {
            self.clock.timed_async(self.store.set(key, encoded)).await
        } else {
            self.clock.timed_async(self.store.set_with_expiry(key, seconds, encoded)).await
        };
        let reply = timed.result.map_err(|e| self.write_failed(op, timed.duration, e))?;

        if reply != OK_REPLY {
            self.telemetry.record(self.name, op, CacheActivity::Error, timed.duration);
            return Err(WriteError::caused_by(
                WriteErrorKind::NotAcknowledged,
                format!("store replied {reply:?}"),
            ));
        }

        self.telemetry.record(self.name, op, CacheActivity::Stored, timed.duration);
        Ok(value)
    }

    fn read_guard(&self, operation: CacheOperation) -> Result<(), ReadError> {
        if self.store.is_started() {
            return Ok(());
        }
        self.telemetry.record_rejected(self.name, operation);
        Err(ReadError::new(ReadErrorKind::NotStarted))
    }

    fn write_guard(&self, operation: CacheOperation) -> Result<(), WriteError> {
        if self.store.is_started() {
            return Ok(());
        }
        self.telemetry.record_rejected(self.name, operation);
        Err(WriteError::new(WriteErrorKind::NotStarted))
    }

    fn read_failed(&self, operation: CacheOperation, duration: Duration, error: StoreError) -> ReadError {
        self.telemetry.record(self.name, operation, CacheActivity::Error, duration);
        ReadError::caused_by(ReadErrorKind::Store, error)
    }

    fn write_failed(&self, operation: CacheOperation, duration: Duration, error: StoreError) -> WriteError {
        self.telemetry.record(self.name, operation, CacheActivity::Error, duration);
        WriteError::caused_by(WriteErrorKind::Store, error)
    }
}

impl<S: fmt::Debug> fmt::Debug for Cache<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("name", &self.name)
            .field("store", &self.store)
            .field("clock", &self.clock)
            .field("observers", &self.observers)
            .field("telemetry", &self.telemetry)
            .finish_non_exhaustive()
    }
}

/// Closes the store and detaches the cache's listener when the cache is dropped.
struct Release(Option<Box<dyn FnOnce() + Send + Sync>>);

impl Drop for Release {
    fn drop(&mut self) {
        if let Some(release) = self.0.take() {
            release();
        }
    }
}
