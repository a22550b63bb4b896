// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Redis store client for `remcache`.
//!
//! [`RedisStore`] implements [`StoreClient`](remcache_store::StoreClient) over a single
//! multiplexed async connection from the [`redis`] crate. Commands are issued against
//! database 0 and their replies are passed through unchanged; the `INFO` text is parsed into
//! an [`InfoReport`](remcache_store::InfoReport).
//!
//! The connection is driven by Tokio, so the store must be started and used from within a
//! Tokio runtime.
//!
//! ```no_run
//! use remcache_redis::RedisStore;
//! use remcache_store::StoreClient;
//!
//! # async fn example() -> Result<(), remcache_store::StoreError> {
//! let store = RedisStore::open("127.0.0.1:6379")?;
//! store.start().await?;
//! store.set("greeting", "\"hello\"".to_string()).await?;
//! store.end().await?;
//! # Ok(())
//! # }
//! ```

mod store;

#[doc(inline)]
pub use store::RedisStore;
