// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use remcache_store::{StoreError, StoreEvent};

use crate::CacheName;

/// A lifecycle or error notification from a [`Cache`](crate::Cache).
///
/// Every event names the cache it came from, so one listener can observe several caches.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum CacheEvent {
    /// The cache's store connection opened.
    Start {
        /// The emitting cache.
        cache: CacheName,
    },
    /// The cache's store connection closed.
    Stop {
        /// The emitting cache.
        cache: CacheName,
    },
    /// The cache's store reported a connection-level failure.
    Error {
        /// The emitting cache.
        cache: CacheName,
        /// The store's error.
        error: StoreError,
    },
}

impl CacheEvent {
    pub(crate) fn from_store(cache: CacheName, event: &StoreEvent) -> Self {
        match event {
            StoreEvent::Start => Self::Start { cache },
            StoreEvent::Stop => Self::Stop { cache },
            StoreEvent::Error(error) => Self::Error {
                cache,
                error: error.clone(),
            },
        }
    }

    /// Returns the name of the emitting cache.
    #[must_use]
    pub fn cache(&self) -> CacheName {
        match self {
            Self::Start { cache } | Self::Stop { cache } | Self::Error { cache, .. } => *cache,
        }
    }
}
