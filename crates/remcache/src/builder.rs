// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for [`Cache`].
//!
//! A builder starts without a store. Pick one with [`CacheBuilder::memory`],
//! [`CacheBuilder::redis`] or [`CacheBuilder::store`], optionally name the cache and switch on
//! telemetry, then call [`CacheBuilder::build`].

#[cfg(feature = "metrics")]
use opentelemetry::metrics::MeterProvider;
use remcache_store::StoreClient;
use tick::Clock;

#[cfg(feature = "redis")]
use crate::ConfigError;
use crate::{
    Cache, CacheConfig,
    cache::CacheName,
    telemetry::config::TelemetryConfig,
};
#[cfg(feature = "memory")]
use remcache_memory::MemoryStore;
#[cfg(feature = "redis")]
use remcache_redis::RedisStore;

/// Builder for a [`Cache`] over one store client.
///
/// Created by [`Cache::builder`].
///
/// # Examples
///
/// ```
/// use remcache::Cache;
/// use tick::Clock;
///
/// let cache = Cache::builder(Clock::new_frozen())
///     .memory()
///     .name("sessions")
///     .build();
///
/// assert_eq!(cache.name(), "sessions");
/// assert!(!cache.is_started());
/// ```
#[derive(Debug)]
pub struct CacheBuilder<S = ()> {
    name: Option<CacheName>,
    config: CacheConfig,
    store: S,
    clock: Clock,
    telemetry: TelemetryConfig,
}

impl CacheBuilder<()> {
    pub(crate) fn new(clock: Clock) -> Self {
        Self {
            name: None,
            config: CacheConfig::default(),
            store: (),
            clock,
            telemetry: TelemetryConfig::new(),
        }
    }

    /// Sets the configuration used to construct a remote store.
    #[must_use]
    pub fn config(self, config: CacheConfig) -> Self {
        Self { config, ..self }
    }

    /// Uses a custom store client.
    ///
    /// # Examples
    ///
    /// ```
    /// # #[cfg(feature = "test-util")]
    /// # fn main() {
    /// use remcache::{Cache, MemoryStore, MockStore};
    /// use tick::Clock;
    ///
    /// let clock = Clock::new_frozen();
    /// let store = MockStore::new(MemoryStore::new(clock.clone()));
    /// let cache = Cache::builder(clock).store(store).build();
    ///
    /// assert!(cache.store().operations().is_empty());
    /// # }
    /// # #[cfg(not(feature = "test-util"))]
    /// # fn main() {}
    /// ```
    pub fn store<S>(self, store: S) -> CacheBuilder<S>
    where
        S: StoreClient,
    {
        CacheBuilder {
            name: self.name,
            config: self.config,
            store,
            clock: self.clock,
            telemetry: self.telemetry,
        }
    }

    /// Uses an in-process store driven by the builder's clock.
    #[cfg(feature = "memory")]
    #[must_use]
    pub fn memory(self) -> CacheBuilder<MemoryStore> {
        let store = MemoryStore::new(self.clock.clone());
        self.store(store)
    }

    /// Uses a Redis store at the configured endpoint.
    ///
    /// No connection is made until the cache is started.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configured endpoint is not a valid store address.
    #[cfg(feature = "redis")]
    pub fn redis(self) -> Result<CacheBuilder<RedisStore>, ConfigError> {
        let endpoint = self.config.endpoint()?;
        let store = RedisStore::open(&endpoint.to_string())
            .map_err(|e| ConfigError::caused_by(format!("cannot open store at {endpoint}"), e))?;
        Ok(self.store(store))
    }
}

impl<S> CacheBuilder<S> {
    /// Names the cache in events and telemetry.
    ///
    /// Defaults to the store's type name.
    #[must_use]
    pub fn name(mut self, name: CacheName) -> Self {
        self.name = Some(name);
        self
    }

    /// Emits a `tracing` event for every cache operation.
    #[cfg(feature = "logs")]
    #[must_use]
    pub fn enable_logs(mut self) -> Self {
        self.telemetry = self.telemetry.with_logs();
        self
    }

    /// Counts and times cache operations with a meter from `provider`.
    #[cfg(feature = "metrics")]
    #[must_use]
    pub fn enable_metrics(mut self, provider: &dyn MeterProvider) -> Self {
        self.telemetry = self.telemetry.with_metrics(provider);
        self
    }

    /// Returns the builder's clock.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }
}

impl<S> CacheBuilder<S>
where
    S: StoreClient + 'static,
{
    /// Builds the cache. The cache starts out stopped.
    pub fn build(self) -> Cache<S> {
        Cache::new(
            short_type_name::<S>(self.name),
            self.store,
            self.clock,
            self.telemetry.build(),
        )
    }
}

fn short_type_name<S>(user_name: Option<CacheName>) -> CacheName {
    if let Some(name) = user_name {
        name
    } else {
        let full = std::any::type_name::<S>();
        let base = full.split_once('<').map_or(full, |(base, _)| base);
        base.rsplit("::").next().unwrap_or(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_type_name_with_user_name() {
        assert_eq!(short_type_name::<String>(Some("custom_name")), "custom_name");
    }

    #[test]
    fn short_type_name_without_user_name() {
        assert_eq!(short_type_name::<String>(None), "String");
    }

    #[test]
    fn short_type_name_drops_generics() {
        assert_eq!(short_type_name::<Vec<Option<u8>>>(None), "Vec");
    }

    #[cfg(feature = "memory")]
    #[test]
    fn memory_cache_is_named_after_its_store() {
        let cache = Cache::builder(Clock::new_frozen()).memory().build();
        assert_eq!(cache.name(), "MemoryStore");
    }

    #[test]
    fn config_is_kept_until_a_store_is_chosen() {
        let builder = Cache::builder(Clock::new_frozen()).config(CacheConfig::new("redis://cache.internal:7000"));
        assert_eq!(builder.config.endpoint, "redis://cache.internal:7000");
    }
}
