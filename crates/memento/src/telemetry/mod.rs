// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Memoization telemetry.
//!
//! With the `logs` feature every cache decision is emitted as a `tracing` event; with the
//! `metrics` feature events are counted and producer run times are recorded through
//! OpenTelemetry. Without either feature recording compiles down to nothing.

use std::time::Duration;

#[cfg(any(feature = "logs", test))]
use opentelemetry::logs::Severity;
#[cfg(any(feature = "metrics", test))]
use opentelemetry::{
    KeyValue,
    metrics::{Counter, Histogram},
};

use crate::cache::CacheName;

pub(crate) mod attributes;
pub(crate) mod config;
#[cfg(any(feature = "metrics", test))]
pub(crate) mod metrics;
#[cfg(test)]
pub(crate) mod testing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MemoOperation {
    GetOrCompute,
    Invalidate,
    Clear,
}

impl MemoOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetOrCompute => "memo.get_or_compute",
            Self::Invalidate => "memo.invalidate",
            Self::Clear => "memo.clear",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MemoActivity {
    Hit,
    Miss,
    Inserted,
    Invalidated,
    ProducerFailed,
    TypeMismatch,
}

impl MemoActivity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "memo.hit",
            Self::Miss => "memo.miss",
            Self::Inserted => "memo.inserted",
            Self::Invalidated => "memo.invalidated",
            Self::ProducerFailed => "memo.producer_failed",
            Self::TypeMismatch => "memo.type_mismatch",
        }
    }

    // Producer failures are returned to the caller, so they are not logged as errors here.
    #[cfg(any(feature = "logs", test))]
    pub fn severity(self) -> Severity {
        match self {
            Self::Hit | Self::Miss => Severity::Debug,
            Self::Inserted | Self::Invalidated | Self::ProducerFailed => Severity::Info,
            Self::TypeMismatch => Severity::Warn,
        }
    }
}

/// Records cache activity as logs and metrics according to the enabled features.
#[derive(Clone, Debug, Default)]
pub(crate) struct MemoTelemetry {
    #[cfg(any(feature = "logs", test))]
    logging_enabled: bool,
    #[cfg(any(feature = "metrics", test))]
    event_counter: Option<Counter<u64>>,
    #[cfg(any(feature = "metrics", test))]
    producer_duration: Option<Histogram<f64>>,
}

impl MemoTelemetry {
    #[inline]
    pub(crate) fn record(&self, name: CacheName, operation: MemoOperation, activity: MemoActivity, duration: Option<Duration>) {
        #[cfg(any(feature = "metrics", test))]
        self.record_metrics(name, operation, activity, duration);

        #[cfg(any(feature = "logs", test))]
        if self.logging_enabled {
            Self::emit(name, operation, activity, duration);
        }

        #[cfg(not(any(feature = "logs", feature = "metrics", test)))]
        let _ = (name, operation, activity, duration);
    }

    #[cfg(any(feature = "metrics", test))]
    fn record_metrics(&self, name: CacheName, operation: MemoOperation, activity: MemoActivity, duration: Option<Duration>) {
        let attrs = [
            KeyValue::new(attributes::MEMO_NAME, name),
            KeyValue::new(attributes::MEMO_OPERATION_NAME, operation.as_str()),
            KeyValue::new(attributes::MEMO_ACTIVITY_NAME, activity.as_str()),
        ];

        if let Some(counter) = &self.event_counter {
            counter.add(1, &attrs);
        }

        if let (Some(d), Some(h)) = (duration, &self.producer_duration) {
            h.record(d.as_secs_f64(), &attrs);
        }
    }

    #[cfg(any(feature = "logs", test))]
    fn emit(name: CacheName, operation: MemoOperation, activity: MemoActivity, duration: Option<Duration>) {
        let op = operation.as_str();
        let ev = activity.as_str();
        let duration_ns = duration.map(|d| d.as_nanos());

        // Tracing level must be constant, so the level is selected through a macro.
        // Field names must match constants in attributes.rs.
        macro_rules! emit_event {
            ($level:ident) => {
                tracing::$level!(
                    memo.name = name,
                    memo.operation = op,
                    memo.activity = ev,
                    memo.duration_ns = ?duration_ns,
                    "memo.event"
                )
            };
        }

        match activity.severity() {
            Severity::Warn => emit_event!(warn),
            Severity::Info => emit_event!(info),
            _ => emit_event!(debug),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{
        config::TelemetryConfig,
        testing::{LogCapture, MetricTester},
    };

    #[test]
    fn operation_as_str() {
        assert_eq!(MemoOperation::GetOrCompute.as_str(), "memo.get_or_compute");
        assert_eq!(MemoOperation::Invalidate.as_str(), "memo.invalidate");
        assert_eq!(MemoOperation::Clear.as_str(), "memo.clear");
    }

    #[test]
    fn activity_as_str() {
        assert_eq!(MemoActivity::Hit.as_str(), "memo.hit");
        assert_eq!(MemoActivity::Miss.as_str(), "memo.miss");
        assert_eq!(MemoActivity::Inserted.as_str(), "memo.inserted");
        assert_eq!(MemoActivity::Invalidated.as_str(), "memo.invalidated");
        assert_eq!(MemoActivity::ProducerFailed.as_str(), "memo.producer_failed");
        assert_eq!(MemoActivity::TypeMismatch.as_str(), "memo.type_mismatch");
    }

    #[test]
    fn activity_severity() {
        assert_eq!(MemoActivity::Hit.severity(), Severity::Debug);
        assert_eq!(MemoActivity::Miss.severity(), Severity::Debug);
        assert_eq!(MemoActivity::Inserted.severity(), Severity::Info);
        assert_eq!(MemoActivity::Invalidated.severity(), Severity::Info);
        assert_eq!(MemoActivity::ProducerFailed.severity(), Severity::Info);
        assert_eq!(MemoActivity::TypeMismatch.severity(), Severity::Warn);
    }

    #[test]
    fn metrics_record_emits_correct_attributes() {
        let tester = MetricTester::new();
        let telemetry = TelemetryConfig::new().with_metrics(tester.meter_provider()).build();

        telemetry.record(
            "my_memo",
            MemoOperation::GetOrCompute,
            MemoActivity::Inserted,
            Some(Duration::from_millis(5)),
        );

        tester.assert_attributes_contain(&[
            KeyValue::new(attributes::MEMO_NAME, "my_memo"),
            KeyValue::new(attributes::MEMO_OPERATION_NAME, MemoOperation::GetOrCompute.as_str()),
            KeyValue::new(attributes::MEMO_ACTIVITY_NAME, MemoActivity::Inserted.as_str()),
        ]);
    }

    #[test]
    fn meter_scope_is_created_from_provider() {
        let tester = MetricTester::new();
        let meter = metrics::create_meter(tester.meter_provider());
        metrics::create_event_counter(&meter).add(1, &[KeyValue::new(attributes::MEMO_NAME, "scoped")]);

        tester.assert_attributes_contain(&[KeyValue::new(attributes::MEMO_NAME, "scoped")]);
    }

    #[test]
    fn logs_emit_contains_all_fields_and_values() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        MemoTelemetry::emit(
            "my_test_memo",
            MemoOperation::Invalidate,
            MemoActivity::Invalidated,
            Some(Duration::from_nanos(12345)),
        );

        capture.assert_contains(attributes::MEMO_NAME);
        capture.assert_contains(attributes::MEMO_OPERATION_NAME);
        capture.assert_contains(attributes::MEMO_ACTIVITY_NAME);
        capture.assert_contains(attributes::MEMO_DURATION_NAME);
        capture.assert_contains(attributes::MEMO_EVENT_NAME);

        capture.assert_contains("my_test_memo");
        capture.assert_contains(MemoOperation::Invalidate.as_str());
        capture.assert_contains(MemoActivity::Invalidated.as_str());
        capture.assert_contains("12345");
    }

    #[test]
    fn logs_emit_at_correct_severity_levels() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());
        MemoTelemetry::emit("memo", MemoOperation::GetOrCompute, MemoActivity::TypeMismatch, None);
        capture.assert_contains("WARN");

        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());
        MemoTelemetry::emit("memo", MemoOperation::GetOrCompute, MemoActivity::Inserted, None);
        capture.assert_contains("INFO");

        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());
        MemoTelemetry::emit("memo", MemoOperation::GetOrCompute, MemoActivity::Hit, None);
        capture.assert_contains("DEBUG");
    }

    #[test]
    fn telemetry_disabled_emits_nothing() {
        let telemetry = MemoTelemetry::default();

        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        telemetry.record("memo", MemoOperation::GetOrCompute, MemoActivity::Hit, Some(Duration::from_secs(1)));

        assert!(capture.output().is_empty());
    }
}
