// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Cache telemetry recording.

use std::time::Duration;

#[cfg(any(feature = "metrics", test))]
use opentelemetry::KeyValue;
#[cfg(any(feature = "logs", test))]
use opentelemetry::logs::Severity;
use opentelemetry::metrics::{Counter, Gauge, Histogram};

#[cfg(any(feature = "metrics", test))]
use crate::telemetry::attributes;
use crate::{
    cache::CacheName,
    telemetry::{CacheActivity, CacheOperation, CacheTelemetry},
};

#[derive(Debug)]
pub(crate) struct CacheTelemetryInner {
    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(dead_code, reason = "logging is compiled out without the logs feature")
    )]
    pub(super) logging_enabled: bool,
    #[cfg_attr(
        not(any(feature = "metrics", test)),
        expect(dead_code, reason = "instruments are only read with the metrics feature")
    )]
    pub(super) event_counter: Option<Counter<u64>>,
    #[cfg_attr(
        not(any(feature = "metrics", test)),
        expect(dead_code, reason = "instruments are only read with the metrics feature")
    )]
    pub(super) operation_duration: Option<Histogram<f64>>,
    #[cfg_attr(
        not(any(feature = "metrics", test)),
        expect(dead_code, reason = "instruments are only read with the metrics feature")
    )]
    pub(super) keys: Option<Gauge<u64>>,
}

impl CacheTelemetry {
    pub(super) fn from_inner(inner: CacheTelemetryInner) -> Self {
        Self {
            inner: std::sync::Arc::new(inner),
        }
    }

    /// Records one cache operation.
    ///
    /// Rejected operations never reach the store and are recorded without a duration.
    #[inline]
    pub(crate) fn record(&self, cache_name: CacheName, operation: CacheOperation, activity: CacheActivity, duration: Option<Duration>) {
        #[cfg(any(feature = "metrics", test))]
        {
            let attrs = [
                KeyValue::new(attributes::CACHE_NAME, cache_name),
                KeyValue::new(attributes::CACHE_OPERATION_NAME, operation.as_str()),
                KeyValue::new(attributes::CACHE_ACTIVITY_NAME, activity.as_str()),
            ];

            if let Some(c) = &self.inner.event_counter {
                c.add(1, &attrs);
            }

            if let (Some(d), Some(h)) = (duration, &self.inner.operation_duration) {
                h.record(d.as_secs_f64(), &attrs);
            }
        }

        #[cfg(any(feature = "logs", test))]
        if self.inner.logging_enabled {
            Self::emit(cache_name, operation, activity, duration);
        }
    }

    /// Records the number of keys in the store database.
    #[inline]
    #[cfg_attr(
        not(any(feature = "metrics", test)),
        expect(unused_variables, reason = "no-op without the metrics feature")
    )]
    pub(crate) fn record_keys(&self, cache_name: CacheName, keys: u64) {
        #[cfg(any(feature = "metrics", test))]
        if let Some(g) = &self.inner.keys {
            g.record(keys, &[KeyValue::new(attributes::CACHE_NAME, cache_name)]);
        }
    }

    #[cfg(any(feature = "logs", test))]
    fn emit(cache_name: CacheName, operation: CacheOperation, activity: CacheActivity, duration: Option<Duration>) {
        let op = operation.as_str();
        let ev = activity.as_str();
        let duration_ns = duration.map(|d| d.as_nanos());

        // Tracing level must be constant, so a macro selects it.
        // Field names must match constants in attributes.rs.
        macro_rules! emit_event {
            ($level:ident) => {
                tracing::$level!(
                    cache.name = cache_name,
                    cache.operation = op,
                    cache.activity = ev,
                    cache.duration_ns = ?duration_ns,
                    "cache.event"
                )
            };
        }

        match activity.severity() {
            Severity::Error => emit_event!(error),
            Severity::Warn => emit_event!(warn),
            Severity::Info => emit_event!(info),
            Severity::Debug => emit_event!(debug),
            _ => {}
        }
    }
}
