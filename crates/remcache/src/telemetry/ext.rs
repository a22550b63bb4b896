// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Extension traits for telemetry recording.

use std::time::Duration;

use tick::Clock;

use crate::{
    cache::CacheName,
    telemetry::{CacheActivity, CacheOperation, CacheTelemetry},
};

/// Result of a timed async operation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TimedResult<R> {
    pub result: R,
    pub duration: Duration,
}

pub(crate) trait ClockExt {
    /// Awaits `f` and measures how long it took on this clock.
    fn timed_async<F, R>(&self, f: F) -> impl Future<Output = TimedResult<R>>
    where
        F: Future<Output = R>;
}

impl ClockExt for Clock {
    async fn timed_async<F, R>(&self, f: F) -> TimedResult<R>
    where
        F: Future<Output = R>,
    {
        let start = self.instant();
        let result = f.await;
        TimedResult {
            result,
            duration: self.instant().saturating_duration_since(start),
        }
    }
}

pub(crate) trait CacheTelemetryExt {
    /// Records an operation that reached the store.
    fn record(&self, name: CacheName, operation: CacheOperation, activity: CacheActivity, duration: Duration);

    /// Records an operation refused before reaching the store.
    fn record_rejected(&self, name: CacheName, operation: CacheOperation);

    /// Records the key count of the store database.
    fn record_keys(&self, name: CacheName, keys: u64);
}

impl CacheTelemetryExt for Option<CacheTelemetry> {
    #[cfg_attr(
        not(any(feature = "logs", feature = "metrics", test)),
        expect(unused_variables, reason = "no-op when telemetry is compiled out")
    )]
    fn record(&self, name: CacheName, operation: CacheOperation, activity: CacheActivity, duration: Duration) {
        #[cfg(any(feature = "logs", feature = "metrics", test))]
        if let Some(t) = self {
            t.record(name, operation, activity, Some(duration));
        }
    }

    #[cfg_attr(
        not(any(feature = "logs", feature = "metrics", test)),
        expect(unused_variables, reason = "no-op when telemetry is compiled out")
    )]
    fn record_rejected(&self, name: CacheName, operation: CacheOperation) {
        #[cfg(any(feature = "logs", feature = "metrics", test))]
        if let Some(t) = self {
            t.record(name, operation, CacheActivity::Rejected, None);
        }
    }

    #[cfg_attr(
        not(any(feature = "logs", feature = "metrics", test)),
        expect(unused_variables, reason = "no-op when telemetry is compiled out")
    )]
    fn record_keys(&self, name: CacheName, keys: u64) {
        #[cfg(any(feature = "logs", feature = "metrics", test))]
        if let Some(t) = self {
            t.record_keys(name, keys);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{config::TelemetryConfig, testing::LogCapture};

    fn block_on<F: Future>(f: F) -> F::Output {
        futures::executor::block_on(f)
    }

    #[test]
    fn timed_async_measures_on_the_given_clock() {
        block_on(async {
            let control = tick::ClockControl::new();
            let clock = control.to_clock();

            let timed = clock
                .timed_async(async {
                    control.advance(Duration::from_millis(250));
                    "done"
                })
                .await;

            assert_eq!(timed.result, "done");
            assert_eq!(timed.duration, Duration::from_millis(250));
        });
    }

    #[test]
    fn disabled_telemetry_emits_nothing() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        let telemetry: Option<CacheTelemetry> = None;
        telemetry.record("cache", CacheOperation::Get, CacheActivity::Hit, Duration::from_millis(1));
        telemetry.record_rejected("cache", CacheOperation::Set);
        telemetry.record_keys("cache", 3);

        assert!(capture.output().is_empty());
    }

    #[test]
    fn rejected_operations_log_a_warning() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        let telemetry = TelemetryConfig::new().with_logs().build();
        telemetry.record_rejected("sessions", CacheOperation::Set);

        capture.assert_contains("WARN");
        capture.assert_contains("cache.rejected");
        capture.assert_contains("sessions");
    }
}
