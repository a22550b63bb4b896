// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for store operations.

/// An error from a store client.
///
/// This is an opaque, clonable error that wraps the underlying cause: a refused command, a
/// dropped connection, a protocol failure. It is clonable because it also travels inside
/// [`StoreEvent::Error`](crate::StoreEvent::Error) notifications.
///
/// # Example
///
/// ```
/// use remcache_store::StoreError;
///
/// let error = StoreError::from_message("connection refused");
/// assert!(error.to_string().contains("connection refused"));
/// ```
#[ohno::error]
#[derive(Clone)]
pub struct StoreError {}

impl StoreError {
    /// Creates a store error from a message or any error type.
    pub fn from_message(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(cause)
    }

    /// Creates the error returned for commands issued while the store is not started.
    #[must_use]
    pub fn not_started() -> Self {
        Self::caused_by("store is not started")
    }

    /// Creates the error returned for commands cut off by a hard stop.
    #[must_use]
    pub fn closed() -> Self {
        Self::caused_by("store connection was closed")
    }
}

/// A specialized [`Result`] type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_contains_cause_message() {
        let error = StoreError::from_message("socket reset");
        let display = format!("{error}");
        assert!(display.contains("socket reset"), "display should contain the cause, got: {display}");
    }

    #[test]
    fn clone_keeps_message() {
        let error = StoreError::not_started();
        let cloned = error.clone();
        assert_eq!(error.to_string(), cloned.to_string());
    }

    #[test]
    fn wraps_foreign_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let error = StoreError::from_message(io);
        assert!(format!("{error:?}").contains("refused"));
    }
}
