// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Cache telemetry integration with `tracing` and OpenTelemetry.
//!
//! With the `logs` feature, cache operations emit structured `tracing` events. With the
//! `metrics` feature, they are counted and timed through an OpenTelemetry meter. Both are
//! switched on per cache through the builder.

#[cfg(any(feature = "logs", test))]
use opentelemetry::logs::Severity;

#[cfg(any(feature = "logs", feature = "metrics", test))]
use std::sync::Arc;

#[cfg(any(feature = "logs", feature = "metrics", test))]
use cache::CacheTelemetryInner;

pub(crate) mod attributes;
#[cfg(any(feature = "logs", feature = "metrics", test))]
pub(crate) mod cache;
pub(crate) mod config;
pub(crate) mod ext;
#[cfg(any(feature = "metrics", test))]
pub(crate) mod metrics;
#[cfg(test)]
pub(crate) mod testing;

/// Records cache operations as logs and metrics.
#[derive(Clone, Debug)]
#[cfg_attr(
    not(any(feature = "logs", feature = "metrics", test)),
    expect(dead_code, reason = "never constructed without a telemetry feature")
)]
pub(crate) struct CacheTelemetry {
    #[cfg(any(feature = "logs", feature = "metrics", test))]
    inner: Arc<CacheTelemetryInner>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheOperation {
    Start,
    Stop,
    End,
    Get,
    Set,
    Remove,
    Exists,
    SetTtl,
    GetTtl,
    RemoveTtl,
    ExistsTtl,
    GetKeys,
    GetStats,
    Flush,
}

impl CacheOperation {
    #[cfg_attr(
        not(any(feature = "logs", feature = "metrics", test)),
        expect(dead_code, reason = "only read by log and metric recording")
    )]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "cache.start",
            Self::Stop => "cache.stop",
            Self::End => "cache.end",
            Self::Get => "cache.get",
            Self::Set => "cache.set",
            Self::Remove => "cache.remove",
            Self::Exists => "cache.exists",
            Self::SetTtl => "cache.set_ttl",
            Self::GetTtl => "cache.get_ttl",
            Self::RemoveTtl => "cache.remove_ttl",
            Self::ExistsTtl => "cache.exists_ttl",
            Self::GetKeys => "cache.get_keys",
            Self::GetStats => "cache.get_stats",
            Self::Flush => "cache.flush",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheActivity {
    Hit,
    Miss,
    Stored,
    Removed,
    Ok,
    Started,
    Stopped,
    Rejected,
    Error,
}

impl CacheActivity {
    #[cfg_attr(
        not(any(feature = "logs", feature = "metrics", test)),
        expect(dead_code, reason = "only read by log and metric recording")
    )]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "cache.hit",
            Self::Miss => "cache.miss",
            Self::Stored => "cache.stored",
            Self::Removed => "cache.removed",
            Self::Ok => "cache.ok",
            Self::Started => "cache.started",
            Self::Stopped => "cache.stopped",
            Self::Rejected => "cache.rejected",
            Self::Error => "cache.error",
        }
    }

    #[cfg(any(feature = "logs", test))]
    pub fn severity(self) -> Severity {
        match self {
            Self::Hit | Self::Miss | Self::Ok => Severity::Debug,
            Self::Stored | Self::Removed | Self::Started | Self::Stopped => Severity::Info,
            Self::Rejected => Severity::Warn,
            Self::Error => Severity::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_operation_as_str() {
        assert_eq!(CacheOperation::Get.as_str(), "cache.get");
        assert_eq!(CacheOperation::Set.as_str(), "cache.set");
        assert_eq!(CacheOperation::SetTtl.as_str(), "cache.set_ttl");
        assert_eq!(CacheOperation::GetStats.as_str(), "cache.get_stats");
        assert_eq!(CacheOperation::End.as_str(), "cache.end");
    }

    #[test]
    fn cache_activity_as_str() {
        assert_eq!(CacheActivity::Hit.as_str(), "cache.hit");
        assert_eq!(CacheActivity::Miss.as_str(), "cache.miss");
        assert_eq!(CacheActivity::Stored.as_str(), "cache.stored");
        assert_eq!(CacheActivity::Removed.as_str(), "cache.removed");
        assert_eq!(CacheActivity::Ok.as_str(), "cache.ok");
        assert_eq!(CacheActivity::Rejected.as_str(), "cache.rejected");
        assert_eq!(CacheActivity::Error.as_str(), "cache.error");
    }

    #[test]
    fn cache_activity_severity() {
        assert_eq!(CacheActivity::Hit.severity(), Severity::Debug);
        assert_eq!(CacheActivity::Ok.severity(), Severity::Debug);
        assert_eq!(CacheActivity::Stored.severity(), Severity::Info);
        assert_eq!(CacheActivity::Started.severity(), Severity::Info);
        assert_eq!(CacheActivity::Rejected.severity(), Severity::Warn);
        assert_eq!(CacheActivity::Error.severity(), Severity::Error);
    }
}
