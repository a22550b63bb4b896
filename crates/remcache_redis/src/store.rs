// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;

use parking_lot::Mutex;
use redis::{Client, Cmd, FromRedisValue, RedisError, RedisResult, aio::MultiplexedConnection};
use remcache_store::{
    InfoReport, Lifecycle, LifecycleState, StoreClient, StoreError, StoreEvent, StoreListener, SubscriptionId,
};

/// A store client for a Redis server.
///
/// The store owns one multiplexed connection, opened by [`start`](StoreClient::start) and
/// released by [`stop`](StoreClient::stop) or [`end`](StoreClient::end). Concurrent commands
/// share the connection and are pipelined by it.
///
/// Connection-level failures (I/O errors, timeouts, a dropped connection) are reported to
/// observers as [`StoreEvent::Error`]. A dropped connection also closes the store, which
/// emits [`StoreEvent::Stop`]; call `start` again to reconnect.
pub struct RedisStore {
    address: String,
    client: Client,
    connection: Mutex<Option<MultiplexedConnection>>,
    lifecycle: Lifecycle,
}

impl RedisStore {
    /// Creates a stopped store for the server at `address` (`host:port`).
    ///
    /// No connection is made until the store is started.
    ///
    /// # Errors
    ///
    /// Fails if `address` does not form a valid Redis URL.
    pub fn open(address: &str) -> Result<Self, StoreError> {
        let client = Client::open(format!("redis://{address}/").as_str()).map_err(StoreError::from_message)?;
        Ok(Self {
            address: address.to_string(),
            client,
            connection: Mutex::new(None),
            lifecycle: Lifecycle::new(),
        })
    }

    /// Returns the `host:port` address this store connects to.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    async fn query<T>(&self, cmd: Cmd) -> Result<T, StoreError>
    where
        T: FromRedisValue + Send,
    {
        let _in_flight = self.lifecycle.admit().await?;
        let mut connection = self.connection.lock().clone().ok_or_else(StoreError::closed)?;
        let reply: RedisResult<T> = cmd.query_async(&mut connection).await;
        reply.map_err(|error| self.command_failed(error))
    }

    fn command_failed(&self, error: RedisError) -> StoreError {
        let dropped = error.is_connection_dropped();
        let connection_level = dropped || error.is_io_error() || error.is_timeout();
        let error = StoreError::from_message(error);

        if connection_level {
            self.lifecycle.emit(&StoreEvent::Error(error.clone()));
        }
        if dropped {
            self.release();
        }
        error
    }

    fn release(&self) {
        drop(self.connection.lock().take());
        let _closed = self.lifecycle.close();
    }
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("address", &self.address)
            .field("connected", &self.connection.lock().is_some())
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}

impl StoreClient for RedisStore {
    fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    async fn start(&self) -> Result<(), StoreError> {
        if self.lifecycle.state().is_started() {
            return Ok(());
        }
        let _previous = self.lifecycle.set_state(LifecycleState::Starting);

        match self.client.get_multiplexed_async_connection().await {
            Ok(connection) => {
                *self.connection.lock() = Some(connection);
                let _previous = self.lifecycle.set_state(LifecycleState::Started);
                self.lifecycle.emit(&StoreEvent::Start);
                Ok(())
            }
            Err(error) => {
                let _previous = self.lifecycle.set_state(LifecycleState::Stopped);
                let error = StoreError::from_message(error);
                self.lifecycle.emit(&StoreEvent::Error(error.clone()));
                Err(error)
            }
        }
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
        self.release();
        Ok(())
    }

    fn terminate(&self) {
        if self.lifecycle.state() == LifecycleState::Stopped {
            return;
        }
        let _previous = self.lifecycle.set_state(LifecycleState::Stopping);
        self.release();
    }

    fn pause(&self) -> bool {
        self.lifecycle.pause()
    }

    fn resume(&self) -> bool {
        self.lifecycle.resume()
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.query(redis::cmd("GET").arg(key).clone()).await
    }

    async fn set(&self, key: &str, value: String) -> Result<String, StoreError> {
        self.query(redis::cmd("SET").arg(key).arg(value).clone()).await
    }

    async fn set_with_expiry(&self, key: &str, seconds: u64, value: String) -> Result<String, StoreError> {
        self.query(redis::cmd("SETEX").arg(key).arg(seconds).arg(value).clone()).await
    }

    async fn delete(&self, key: &str) -> Result<u64, StoreError> {
        self.query(redis::cmd("DEL").arg(key).clone()).await
    }

    async fn exists(&self, key: &str) -> Result<u64, StoreError> {
        self.query(redis::cmd("EXISTS").arg(key).clone()).await
    }

    async fn expire(&self, key: &str, seconds: u64) -> Result<i64, StoreError> {
        self.query(redis::cmd("EXPIRE").arg(key).arg(seconds).clone()).await
    }

    async fn ttl(&self, key: &str) -> Result<i64, StoreError> {
        self.query(redis::cmd("TTL").arg(key).clone()).await
    }

    async fn persist(&self, key: &str) -> Result<i64, StoreError> {
        self.query(redis::cmd("PERSIST").arg(key).clone()).await
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.query(redis::cmd("KEYS").arg("*").clone()).await
    }

    async fn info(&self) -> Result<InfoReport, StoreError> {
        let text: String = self.query(redis::cmd("INFO")).await?;
        Ok(InfoReport::parse(&text))
    }

    async fn flush_all(&self) -> Result<(), StoreError> {
        self.query(redis::cmd("FLUSHDB")).await
    }

    fn observe(&self, listener: StoreListener) -> SubscriptionId {
        self.lifecycle.observe(listener)
    }

    fn unobserve(&self, id: SubscriptionId) -> bool {
        self.lifecycle.unobserve(id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    #[test]
    fn open_does_not_connect() {
        let store = RedisStore::open("127.0.0.1:6379").unwrap();
        assert_eq!(store.address(), "127.0.0.1:6379");
        assert_eq!(store.state(), LifecycleState::Stopped);
        assert!(format!("{store:?}").contains("connected: false"));
    }

    #[test]
    fn open_rejects_malformed_address() {
        assert!(RedisStore::open("127.0.0.1:not-a-port").is_err());
    }

    #[tokio::test]
    async fn commands_before_start_are_refused() {
        let store = RedisStore::open("127.0.0.1:6379").unwrap();
        assert!(store.get("k").await.is_err());
        assert!(store.flush_all().await.is_err());
        assert!(!store.pause());
    }

    #[tokio::test]
    async fn unreachable_server_fails_start_and_emits_error() {
        // Nothing listens on port 1.
        let store = RedisStore::open("127.0.0.1:1").unwrap();
        let errors = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&errors);
        let _id = store.observe(Box::new(move |event: &StoreEvent| {
            if matches!(event, StoreEvent::Error(_)) {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }));

        assert!(store.start().await.is_err());
        assert_eq!(store.state(), LifecycleState::Stopped);
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stop_and_end_on_stopped_store_are_no_ops() {
        let store = RedisStore::open("127.0.0.1:6379").unwrap();
        store.stop().await.unwrap();
        store.end().await.unwrap();
        store.terminate();
        assert_eq!(store.state(), LifecycleState::Stopped);
    }
}
