// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Store client abstractions for the `remcache` adapter.
//!
//! This crate defines the [`StoreClient`] trait that every backing key-value store must satisfy,
//! the [`LifecycleState`] a store reports, the [`StoreEvent`]s it emits through a typed
//! [`Observers`] registry, and [`StoreError`] for failed commands.
//!
//! # Overview
//!
//! A store client owns one connection to a remote key-value store. It exposes the raw
//! primitives of that store (`get`, `set`, `ttl`, `info`, ...) and returns replies in the
//! store's own conventions: TTL replies use negative sentinels, writes reply `"OK"`, the
//! diagnostic report is a nested [`InfoReport`]. The `remcache` crate turns these into
//! cache semantics.
//!
//! Concrete stores share the [`Lifecycle`] helper, which tracks the state, defers commands
//! while paused and lets a graceful shutdown wait for in-flight commands.
//!
//! # Implementing a Store Client
//!
//! Hold a [`Lifecycle`], await [`Lifecycle::admit`] at the start of every data command and
//! drive the state from `start`, `stop` and `end`. See `remcache_memory` for a complete
//! in-process implementation.

mod client;
pub mod error;
mod events;
mod info;
mod lifecycle;
mod state;
#[cfg(any(feature = "test-util", test))]
pub mod testing;

#[doc(inline)]
pub use client::{StoreClient, StoreListener};
#[doc(inline)]
pub use error::{Result, StoreError};
#[doc(inline)]
pub use events::{Observers, StoreEvent, SubscriptionId};
#[doc(inline)]
pub use info::InfoReport;
#[doc(inline)]
pub use lifecycle::{InFlight, Lifecycle};
#[doc(inline)]
pub use state::LifecycleState;

/// The acknowledgement a store sends for a successful write.
pub const OK_REPLY: &str = "OK";
