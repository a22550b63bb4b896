// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;

/// The connection lifecycle of a store client.
///
/// ```text
/// Stopped -> Starting -> Started <-> Paused
///                          |  \
///                       Ending  Stopping
///                          \    /
///                         Stopped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    /// No connection is open.
    #[default]
    Stopped,
    /// A connection is being opened.
    Starting,
    /// The connection is open and commands are delivered.
    Started,
    /// The connection is open but command delivery is deferred until resumed.
    Paused,
    /// Graceful shutdown: in-flight commands are completing, new ones are refused.
    Ending,
    /// Hard shutdown: the connection is being closed without waiting.
    Stopping,
}

impl LifecycleState {
    /// Returns `true` while the connection is open, including while paused.
    ///
    /// # Examples
    ///
    /// ```
    /// use remcache_store::LifecycleState;
    ///
    /// assert!(LifecycleState::Started.is_started());
    /// assert!(LifecycleState::Paused.is_started());
    /// assert!(!LifecycleState::Ending.is_started());
    /// ```
    #[must_use]
    pub fn is_started(self) -> bool {
        matches!(self, Self::Started | Self::Paused)
    }

    /// Returns `true` if command delivery is deferred.
    #[must_use]
    pub fn is_paused(self) -> bool {
        self == Self::Paused
    }

    /// Returns the lowercase name used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Started => "started",
            Self::Paused => "paused",
            Self::Ending => "ending",
            Self::Stopping => "stopping",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_open_states_are_started() {
        let started: Vec<_> = [
            LifecycleState::Stopped,
            LifecycleState::Starting,
            LifecycleState::Started,
            LifecycleState::Paused,
            LifecycleState::Ending,
            LifecycleState::Stopping,
        ]
        .into_iter()
        .filter(|state| state.is_started())
        .collect();

        assert_eq!(started, vec![LifecycleState::Started, LifecycleState::Paused]);
    }

    #[test]
    fn default_is_stopped() {
        assert_eq!(LifecycleState::default(), LifecycleState::Stopped);
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(LifecycleState::Ending.to_string(), "ending");
        assert_eq!(LifecycleState::Paused.as_str(), "paused");
    }
}
