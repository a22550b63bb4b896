// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Mapping between requested TTLs and raw store TTL replies.
//!
//! A raw reply is `-2` for an absent key, `-1` for a key without expiry and the remaining
//! seconds otherwise.

use std::time::Duration;

/// Rounds a requested TTL to whole seconds. Zero stays zero; any positive TTL is at least 1.
pub(crate) fn whole_seconds(ttl: Duration) -> u64 {
    if ttl.is_zero() {
        return 0;
    }
    let rounded = ttl.as_millis().saturating_add(500) / 1000;
    u64::try_from(rounded).unwrap_or(u64::MAX).max(1)
}

/// Remaining time for a raw reply; zero for an absent key or one without expiry.
pub(crate) fn remaining(raw: i64) -> Duration {
    u64::try_from(raw).map(Duration::from_secs).unwrap_or_default()
}

/// Whether a raw reply reports a key with an expiry.
pub(crate) fn is_expiring(raw: i64) -> bool {
    raw >= 0
}
