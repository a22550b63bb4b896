// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::LazyLock;

use regex::Regex;
use remcache_store::InfoReport;

static KEYS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i-u)keys=([0-9]+)").expect("keys pattern is a valid literal regex"));

/// A usage snapshot of the store's database.
///
/// Each call to [`Cache::get_stats`](crate::Cache::get_stats) reads a fresh snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CacheStats {
    /// Number of keys in the database.
    pub keys: u64,
    /// Number of successful key lookups since the server started.
    pub hits: u64,
    /// Number of failed key lookups since the server started.
    pub misses: u64,
}

/// Extracts usage figures for database `db_index` from a diagnostic report.
///
/// A missing database section counts as zero keys; missing or garbled counters count as zero.
pub(crate) fn parse(report: &InfoReport, db_index: u32) -> CacheStats {
    let keys = report
        .field("keyspace", &format!("db{db_index}"))
        .and_then(|line| KEYS_PATTERN.captures(line))
        .and_then(|captures| captures.get(1))
        .map_or(0, |digits| digits.as_str().parse().unwrap_or(u64::MAX));

    CacheStats {
        keys,
        hits: report.field("stats", "keyspace_hits").map_or(0, leading_integer),
        misses: report.field("stats", "keyspace_misses").map_or(0, leading_integer),
    }
}

/// Reads the leading decimal digits of `text`, saturating on overflow. No digits reads as zero.
fn leading_integer(text: &str) -> u64 {
    text.trim_start()
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0_u64, |total, digit| {
            total.saturating_mul(10).saturating_add(u64::from(digit - b'0'))
        })
}
