//! Metrics
//!
//! Counter and histogram declarations over the OpenTelemetry meter API, plus
//! helpers for recording operation timings.

use std::{future::Future, time::Instant};

use opentelemetry::{metrics::Histogram, KeyValue};

/// Declare a static meter for the current module.
#[macro_export]
macro_rules! global_meter {
    ($name:ident, $meter_name:literal) => {
        static $name: $crate::once_cell::sync::Lazy<$crate::opentelemetry::metrics::Meter> =
            $crate::once_cell::sync::Lazy::new(|| {
                $crate::opentelemetry::global::meter($meter_name)
            });
    };
}

/// Declare a `u64` counter on the given meter, named after the static.
#[macro_export]
macro_rules! counter_metric {
    ($name:ident, $meter:ident) => {
        pub(crate) static $name: $crate::once_cell::sync::Lazy<
            $crate::opentelemetry::metrics::Counter<u64>,
        > = $crate::once_cell::sync::Lazy::new(|| $meter.u64_counter(stringify!($name)).init());
    };
}

/// Declare an `f64` histogram on the given meter, named after the static.
#[macro_export]
macro_rules! histogram_metric_f64 {
    ($name:ident, $meter:ident) => {
        pub(crate) static $name: $crate::once_cell::sync::Lazy<
            $crate::opentelemetry::metrics::Histogram<f64>,
        > = $crate::once_cell::sync::Lazy::new(|| $meter.f64_histogram(stringify!($name)).init());
    };
}

/// Build a `&[KeyValue]` attribute slice from `(key, value)` pairs.
#[macro_export]
macro_rules! metric_attributes {
    ($(($key:expr, $value:expr)),+ $(,)?) => {
        &[$($crate::opentelemetry::KeyValue::new($key, $value)),+]
    };
}

/// Await the given future, recording the time it took into `metric`.
pub async fn record_operation_time<F, R>(
    future: F,
    metric: &Histogram<f64>,
    attributes: &[KeyValue],
) -> R
where
    F: Future<Output = R>,
{
    let start = Instant::now();
    let result = future.await;
    metric.record(start.elapsed().as_secs_f64(), attributes);
    result
}
