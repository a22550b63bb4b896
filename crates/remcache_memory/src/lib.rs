// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! In-process store client for `remcache`.
//!
//! This crate provides [`MemoryStore`], a [`StoreClient`](remcache_store::StoreClient) that keeps
//! its keyspace in memory and answers with the same reply conventions as a remote key-value
//! server: `"OK"` acknowledgements, `-2`/`-1` TTL sentinels and a keyspace/stats diagnostic
//! report. Expiry follows the [`Clock`](tick::Clock) the store was created with, so tests can
//! move time with `tick::ClockControl` instead of sleeping.
//!
//! # Quick Start
//!
//! ```
//! use remcache_memory::MemoryStore;
//! use remcache_store::StoreClient;
//! use tick::Clock;
//!
//! # futures::executor::block_on(async {
//! let store = MemoryStore::new(Clock::new_frozen());
//! store.start().await?;
//!
//! assert_eq!(store.set("greeting", "\"hello\"".to_string()).await?, "OK");
//! assert_eq!(store.get("greeting").await?.as_deref(), Some("\"hello\""));
//! assert_eq!(store.ttl("greeting").await?, -1);
//! # Ok::<(), remcache_store::StoreError>(())
//! # });
//! ```
//!
//! The keyspace models the server rather than the connection: it survives `stop()` and
//! `start()`.

pub mod store;

#[doc(inline)]
pub use store::MemoryStore;
