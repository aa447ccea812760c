// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Telemetry configuration collected by the cache builder.

#[cfg(any(feature = "metrics", test))]
use opentelemetry::metrics::{Meter, MeterProvider};

use crate::telemetry::MemoTelemetry;

/// Configuration for memoization telemetry.
///
/// Everything is disabled by default. The builder turns logs and metrics on
/// individually, then calls [`build`](Self::build) once the cache is constructed.
#[derive(Clone, Debug, Default)]
pub(crate) struct TelemetryConfig {
    #[cfg(any(feature = "logs", test))]
    logs_enabled: bool,
    #[cfg(any(feature = "metrics", test))]
    meter: Option<Meter>,
}

impl TelemetryConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables structured logging through the `tracing` crate.
    #[cfg(any(feature = "logs", test))]
    #[must_use]
    pub fn with_logs(self) -> Self {
        Self {
            logs_enabled: true,
            ..self
        }
    }

    /// Enables metrics collection using the provided meter provider.
    #[cfg(any(feature = "metrics", test))]
    #[must_use]
    pub fn with_metrics(mut self, provider: &dyn MeterProvider) -> Self {
        self.meter = Some(crate::telemetry::metrics::create_meter(provider));
        self
    }

    #[must_use]
    pub fn build(self) -> MemoTelemetry {
        MemoTelemetry {
            #[cfg(any(feature = "logs", test))]
            logging_enabled: self.logs_enabled,
            #[cfg(any(feature = "metrics", test))]
            event_counter: self.meter.as_ref().map(crate::telemetry::metrics::create_event_counter),
            #[cfg(any(feature = "metrics", test))]
            producer_duration: self
                .meter
                .as_ref()
                .map(crate::telemetry::metrics::create_producer_duration_histogram),
        }
    }
}
