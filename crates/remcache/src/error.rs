// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for cache operations.
//!
//! Reads fail with [`ReadError`], writes with [`WriteError`]. Both carry a kind that tells
//! a rejected precondition apart from a store failure, and keep the underlying
//! [`StoreError`](remcache_store::StoreError) or codec error as their cause.

use std::fmt;

/// Why a read operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ReadErrorKind {
    /// The cache was not started; the store was not contacted.
    NotStarted,
    /// The stored value could not be decoded.
    Decode,
    /// The store failed the command.
    Store,
}

impl fmt::Display for ReadErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotStarted => "cache is not open",
            Self::Decode => "stored value could not be decoded",
            Self::Store => "store command failed",
        })
    }
}

/// Why a write operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum WriteErrorKind {
    /// The cache was not started; the store was not contacted.
    NotStarted,
    /// The value cannot be represented in the store.
    UnsupportedValue,
    /// A TTL of zero was requested where a positive one is required.
    InvalidTtl,
    /// The store answered the write with something other than an acknowledgement.
    NotAcknowledged,
    /// The key whose expiry should change does not exist.
    UndefinedKey,
    /// The store failed the command.
    Store,
}

impl fmt::Display for WriteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotStarted => "cache is not open",
            Self::UnsupportedValue => "value is not supported",
            Self::InvalidTtl => "ttl needs to be higher than 0",
            Self::NotAcknowledged => "value could not be set",
            Self::UndefinedKey => "ttl cannot be set on undefined key",
            Self::Store => "store command failed",
        })
    }
}

/// An error from a cache read.
///
/// # Examples
///
/// ```
/// use remcache::{Cache, ReadErrorKind};
/// use tick::Clock;
/// # futures::executor::block_on(async {
///
/// let cache = Cache::builder(Clock::new_frozen()).memory().build();
///
/// // Not started yet.
/// let error = cache.get("key").await.unwrap_err();
/// assert_eq!(error.kind(), ReadErrorKind::NotStarted);
/// # });
/// ```
#[ohno::error]
#[display("cache read failed: {kind}")]
pub struct ReadError {
    kind: ReadErrorKind,
}

impl ReadError {
    /// Returns why the read failed.
    #[must_use]
    pub fn kind(&self) -> ReadErrorKind {
        self.kind
    }
}

/// An error from a cache write.
#[ohno::error]
#[display("cache write failed: {kind}")]
pub struct WriteError {
    kind: WriteErrorKind,
}

impl WriteError {
    /// Returns why the write failed.
    #[must_use]
    pub fn kind(&self) -> WriteErrorKind {
        self.kind
    }
}

/// An invalid cache configuration.
#[ohno::error]
#[display("invalid cache configuration: {reason}")]
pub struct ConfigError {
    reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_error_display_names_kind() {
        let error = ReadError::new(ReadErrorKind::NotStarted);
        assert!(error.to_string().contains("cache is not open"), "got: {error}");
        assert_eq!(error.kind(), ReadErrorKind::NotStarted);
    }

    #[test]
    fn write_error_keeps_cause() {
        let error = WriteError::caused_by(WriteErrorKind::Store, "connection reset");
        let display = error.to_string();
        assert!(display.contains("store command failed"), "got: {display}");
        assert!(display.contains("connection reset"), "got: {display}");
    }

    #[test]
    fn config_error_names_reason() {
        let error = ConfigError::new("empty host");
        assert!(error.to_string().contains("empty host"));
    }

    #[test]
    fn kinds_display_messages() {
        assert_eq!(WriteErrorKind::InvalidTtl.to_string(), "ttl needs to be higher than 0");
        assert_eq!(WriteErrorKind::UndefinedKey.to_string(), "ttl cannot be set on undefined key");
        assert_eq!(WriteErrorKind::NotAcknowledged.to_string(), "value could not be set");
        assert_eq!(ReadErrorKind::Decode.to_string(), "stored value could not be decoded");
    }
}
