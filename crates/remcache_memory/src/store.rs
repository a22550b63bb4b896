// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-memory keyspace with clock-driven expiry.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use remcache_store::{
    InfoReport, Lifecycle, LifecycleState, OK_REPLY, StoreClient, StoreError, StoreEvent, StoreListener, SubscriptionId,
};
use tick::Clock;

#[derive(Debug)]
struct Slot {
    value: String,
    expires_at: Option<Instant>,
}

#[derive(Debug, Default)]
struct Keyspace {
    entries: HashMap<String, Slot>,
    hits: u64,
    misses: u64,
}

impl Keyspace {
    /// Returns the slot for `key` unless it is absent or expired. Expired slots are removed.
    fn live(&mut self, key: &str, now: Instant) -> Option<&mut Slot> {
        let expired = self
            .entries
            .get(key)
            .is_some_and(|slot| slot.expires_at.is_some_and(|deadline| now >= deadline));
        if expired {
            let _removed = self.entries.remove(key);
        }
        self.entries.get_mut(key)
    }

    fn purge(&mut self, now: Instant) {
        self.entries
            .retain(|_, slot| slot.expires_at.is_none_or(|deadline| now < deadline));
    }
}

/// A store client backed by an in-process keyspace.
///
/// Keys expire once the clock reaches their deadline. Replies follow remote server conventions
/// so that a `remcache::Cache` behaves the same over this store as over a real server.
///
/// # Examples
///
/// ```
/// use remcache_memory::MemoryStore;
/// use remcache_store::StoreClient;
/// use tick::Clock;
///
/// # futures::executor::block_on(async {
/// let store = MemoryStore::new(Clock::new_frozen());
/// store.start().await?;
///
/// store.set_with_expiry("session", 30, "{}".to_string()).await?;
/// assert_eq!(store.ttl("session").await?, 30);
/// assert_eq!(store.ttl("unknown").await?, -2);
/// # Ok::<(), remcache_store::StoreError>(())
/// # });
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    clock: Clock,
    lifecycle: Lifecycle,
    keyspace: Mutex<Keyspace>,
}

impl MemoryStore {
    /// Creates an empty, stopped store that measures expiry with `clock`.
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            lifecycle: Lifecycle::new(),
            keyspace: Mutex::new(Keyspace::default()),
        }
    }

    /// Returns the number of keys currently held, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keyspace.lock().entries.len()
    }

    /// Returns `true` if no key is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Simulates the server dropping the connection.
    ///
    /// Emits [`StoreEvent::Error`] with `error`, then closes the store and emits
    /// [`StoreEvent::Stop`]. Does nothing if the store is stopped.
    pub fn drop_connection(&self, error: StoreError) {
        if self.lifecycle.state() == LifecycleState::Stopped {
            return;
        }
        self.lifecycle.emit(&StoreEvent::Error(error));
        let _closed = self.lifecycle.close();
    }

}

/// The instant `seconds` after `now`, failing the way the remote server does when the sum overflows.
fn deadline(now: Instant, seconds: u64, command: &str) -> Result<Instant, StoreError> {
    now.checked_add(Duration::from_secs(seconds))
        .ok_or_else(|| StoreError::from_message(format!("invalid expire time in '{command}' command")))
}

/// Rounds a remaining duration to whole seconds the way the remote server reports it.
fn rounded_seconds(remaining: Duration) -> i64 {
    i64::try_from(remaining.as_millis().saturating_add(500) / 1000).unwrap_or(i64::MAX)
}

impl StoreClient for MemoryStore {
    fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    async fn start(&self) -> Result<(), StoreError> {
        if self.lifecycle.state().is_started() {
            return Ok(());
        }
        let _previous = self.lifecycle.set_state(LifecycleState::Starting);
        let _previous = self.lifecycle.set_state(LifecycleState::Started);
        self.lifecycle.emit(&StoreEvent::Start);
        Ok(())
    }

    async fn stop(&self) -> Result<(), StoreError> {
        self.terminate();
        Ok(())
    }

    async fn end(&self) -> Result<(), StoreError> {
        if self.lifecycle.state() == LifecycleState::Stopped {
            return Ok(());
        }
        let _previous = self.lifecycle.set_state(LifecycleState::Ending);
        self.lifecycle.drain().await;
        let _closed = self.lifecycle.close();
        Ok(())
    }

    fn terminate(&self) {
        if self.lifecycle.state() == LifecycleState::Stopped {
            return;
        }
        let _previous = self.lifecycle.set_state(LifecycleState::Stopping);
        let _closed = self.lifecycle.close();
    }

    fn pause(&self) -> bool {
        self.lifecycle.pause()
    }

    fn resume(&self) -> bool {
        self.lifecycle.resume()
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _in_flight = self.lifecycle.admit().await?;
        let now = self.clock.instant();
        let mut keyspace = self.keyspace.lock();
        let value = keyspace.live(key, now).map(|slot| slot.value.clone());
        if value.is_some() {
            keyspace.hits += 1;
        } else {
            keyspace.misses += 1;
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<String, StoreError> {
        let _in_flight = self.lifecycle.admit().await?;
        let _previous = self
            .keyspace
            .lock()
            .entries
            .insert(key.to_string(), Slot { value, expires_at: None });
        Ok(OK_REPLY.to_string())
    }

    async fn set_with_expiry(&self, key: &str, seconds: u64, value: String) -> Result<String, StoreError> {
        let _in_flight = self.lifecycle.admit().await?;
        if seconds == 0 {
            return Err(StoreError::from_message("invalid expire time in 'setex' command"));
        }
        let slot = Slot {
            value,
            expires_at: Some(deadline(self.clock.instant(), seconds, "setex")?),
        };
        let _previous = self.keyspace.lock().entries.insert(key.to_string(), slot);
        Ok(OK_REPLY.to_string())
    }

    async fn delete(&self, key: &str) -> Result<u64, StoreError> {
        let _in_flight = self.lifecycle.admit().await?;
        let now = self.clock.instant();
        let mut keyspace = self.keyspace.lock();
        let existed = keyspace.live(key, now).is_some();
        if existed {
            let _removed = keyspace.entries.remove(key);
        }
        Ok(u64::from(existed))
    }

    async fn exists(&self, key: &str) -> Result<u64, StoreError> {
        let _in_flight = self.lifecycle.admit().await?;
        let now = self.clock.instant();
        Ok(u64::from(self.keyspace.lock().live(key, now).is_some()))
    }

    async fn expire(&self, key: &str, seconds: u64) -> Result<i64, StoreError> {
        let _in_flight = self.lifecycle.admit().await?;
        let now = self.clock.instant();
        let mut keyspace = self.keyspace.lock();
        if keyspace.live(key, now).is_none() {
            return Ok(0);
        }
        if seconds == 0 {
            let _removed = keyspace.entries.remove(key);
        } else if let Some(slot) = keyspace.entries.get_mut(key) {
            slot.expires_at = Some(deadline(now, seconds, "expire")?);
        }
        Ok(1)
    }

    async fn ttl(&self, key: &str) -> Result<i64, StoreError> {
        let _in_flight = self.lifecycle.admit().await?;
        let now = self.clock.instant();
        let reply = match self.keyspace.lock().live(key, now) {
            None => -2,
            Some(Slot { expires_at: None, .. }) => -1,
            Some(Slot {
                expires_at: Some(deadline), ..
            }) => rounded_seconds(deadline.saturating_duration_since(now)),
        };
        Ok(reply)
    }

    async fn persist(&self, key: &str) -> Result<i64, StoreError> {
        let _in_flight = self.lifecycle.admit().await?;
        let now = self.clock.instant();
        let cleared = self
            .keyspace
            .lock()
            .live(key, now)
            .and_then(|slot| slot.expires_at.take())
            .is_some();
        Ok(i64::from(cleared))
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let _in_flight = self.lifecycle.admit().await?;
        let now = self.clock.instant();
        let mut keyspace = self.keyspace.lock();
        keyspace.purge(now);
        Ok(keyspace.entries.keys().cloned().collect())
    }

    async fn info(&self) -> Result<InfoReport, StoreError> {
        let _in_flight = self.lifecycle.admit().await?;
        let now = self.clock.instant();
        let mut keyspace = self.keyspace.lock();
        keyspace.purge(now);

        let mut report = InfoReport::new();
        report.insert("server", "store", "memory");
        report.insert("stats", "keyspace_hits", keyspace.hits.to_string());
        report.insert("stats", "keyspace_misses", keyspace.misses.to_string());

        let keys = keyspace.entries.len();
        if keys > 0 {
            let expires = keyspace.entries.values().filter(|slot| slot.expires_at.is_some()).count();
            report.insert("keyspace", "db0", format!("keys={keys},expires={expires},avg_ttl=0"));
        }

        Ok(report)
    }

    async fn flush_all(&self) -> Result<(), StoreError> {
        let _in_flight = self.lifecycle.admit().await?;
        self.keyspace.lock().entries.clear();
        Ok(())
    }

    fn observe(&self, listener: StoreListener) -> SubscriptionId {
        self.lifecycle.observe(listener)
    }

    fn unobserve(&self, id: SubscriptionId) -> bool {
        self.lifecycle.unobserve(id)
    }
}
