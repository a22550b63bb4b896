// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Async cache semantics over a remote key-value store.
//!
//! A [`Cache`] owns one [`StoreClient`] and turns the store's raw commands into cache
//! operations:
//! - `set`/`get`/`remove`/`exists` on JSON [`Value`]s
//! - TTL management (`set_ttl`, `get_ttl`, `remove_ttl`, `exists_ttl`)
//! - key listing, usage statistics and bulk flush
//!
//! The connection has an explicit lifecycle. A cache starts out stopped and every data
//! operation on a stopped cache fails fast without reaching the store. [`Cache::end`] lets
//! in-flight operations finish before closing; [`Cache::stop`] closes immediately.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use remcache::{Cache, Value};
//! use tick::Clock;
//! # futures::executor::block_on(async {
//!
//! let mut cache = Cache::builder(Clock::new_frozen()).memory().name("sessions").build();
//! cache.start().await?;
//!
//! cache.set("user:1", serde_json::json!({ "name": "Ada", "roles": ["admin"] }), Duration::from_secs(60)).await?;
//! assert_eq!(cache.get("user:1").await?["name"], "Ada");
//! assert_eq!(cache.get_ttl("user:1").await?, Duration::from_secs(60));
//!
//! assert!(cache.remove("user:1").await?);
//! assert_eq!(cache.get("user:1").await?, Value::Null);
//!
//! cache.end().await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # }).unwrap();
//! ```
//!
//! # Stores
//!
//! - `memory` (default): `MemoryStore`, an in-process store with clock-driven expiry.
//! - `redis`: `RedisStore`, built from [`CacheConfig`] via `CacheBuilder::redis`.
//! - `test-util`: `MockStore`, which records commands and injects failures.
//!
//! Any other [`StoreClient`] can be plugged in with [`CacheBuilder::store`].
//!
//! # Telemetry
//!
//! With the `logs` feature, `CacheBuilder::enable_logs` emits a `tracing` event per operation.
//! With the `metrics` feature, `CacheBuilder::enable_metrics` records OpenTelemetry counters,
//! durations and the key count.

pub mod builder;
pub mod cache;
mod codec;
mod config;
pub mod error;
mod events;
mod stats;
mod telemetry;
mod ttl;

#[doc(inline)]
pub use builder::CacheBuilder;
#[doc(inline)]
pub use cache::{Cache, CacheName};
#[doc(inline)]
pub use config::{CacheConfig, DEFAULT_ENDPOINT, DEFAULT_PORT, ENDPOINT_VAR, Endpoint};
#[doc(inline)]
pub use error::{ConfigError, ReadError, ReadErrorKind, WriteError, WriteErrorKind};
#[doc(inline)]
pub use events::CacheEvent;
#[cfg(feature = "memory")]
#[doc(inline)]
pub use remcache_memory::MemoryStore;
#[cfg(feature = "redis")]
#[doc(inline)]
pub use remcache_redis::RedisStore;
#[doc(inline)]
pub use remcache_store::{InfoReport, LifecycleState, StoreClient, StoreError, StoreEvent, SubscriptionId};
#[cfg(feature = "test-util")]
#[doc(inline)]
pub use remcache_store::testing::{MockStore, StoreOp};
#[doc(inline)]
pub use serde_json::Value;
#[doc(inline)]
pub use stats::CacheStats;
