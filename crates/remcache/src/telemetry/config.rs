// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Per-cache telemetry switches collected by the builder.

#[cfg(any(feature = "metrics", test))]
use opentelemetry::metrics::{Meter, MeterProvider};

use crate::telemetry::CacheTelemetry;
#[cfg(any(feature = "logs", feature = "metrics", test))]
use crate::telemetry::cache::CacheTelemetryInner;

/// Which telemetry outputs a cache records to.
///
/// Everything starts disabled. [`build`](Self::build) yields `None` unless at least one
/// output was switched on, so a cache without telemetry pays for a single `Option` check.
#[derive(Clone, Debug, Default)]
pub(crate) struct TelemetryConfig {
    #[cfg(any(feature = "logs", test))]
    logs_enabled: bool,
    #[cfg(any(feature = "metrics", test))]
    meter: Option<Meter>,
}

impl TelemetryConfig {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Emits a `tracing` event for every cache operation.
    #[cfg(any(feature = "logs", test))]
    #[must_use]
    pub(crate) fn with_logs(self) -> Self {
        Self {
            logs_enabled: true,
            ..self
        }
    }

    /// Counts and times cache operations through a meter taken from `provider`.
    #[cfg(any(feature = "metrics", test))]
    #[must_use]
    pub(crate) fn with_metrics(mut self, provider: &dyn MeterProvider) -> Self {
        self.meter = Some(crate::telemetry::metrics::create_meter(provider));
        self
    }

    #[cfg(not(any(feature = "logs", feature = "metrics", test)))]
    #[must_use]
    pub(crate) fn build(self) -> Option<CacheTelemetry> {
        None
    }

    #[cfg(any(feature = "logs", feature = "metrics", test))]
    #[must_use]
    pub(crate) fn build(self) -> Option<CacheTelemetry> {
        #[cfg(any(feature = "logs", test))]
        let logging_enabled = self.logs_enabled;
        #[cfg(not(any(feature = "logs", test)))]
        let logging_enabled = false;

        #[cfg(any(feature = "metrics", test))]
        let (event_counter, operation_duration, keys) = {
            use crate::telemetry::metrics::{create_event_counter, create_keys_gauge, create_operation_duration_histogram};
            (
                self.meter.as_ref().map(create_event_counter),
                self.meter.as_ref().map(create_operation_duration_histogram),
                self.meter.as_ref().map(create_keys_gauge),
            )
        };
        #[cfg(not(any(feature = "metrics", test)))]
        let (event_counter, operation_duration, keys) = (None, None, None);

        if !logging_enabled && event_counter.is_none() {
            return None;
        }

        Some(CacheTelemetry::from_inner(CacheTelemetryInner {
            logging_enabled,
            event_counter,
            operation_duration,
            keys,
        }))
    }
}
