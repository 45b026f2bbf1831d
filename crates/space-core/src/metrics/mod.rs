//! Metrics abstraction for claim operations.
//!
//! Backends (prometheus, ...) implement [`MetricsBackend`] and are injected into
//! the coordinators. Without one, a no-op backend is used.
mod backend;
pub use backend::{MetricsBackend, MetricsHandle, Operation, Outcome};

mod noop;
pub use noop::NoOpMetrics;

use std::{sync::Arc, time::Instant};

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}

/// Record the end of an operation that started at `started`.
pub(crate) fn observe(
    metrics: &MetricsHandle,
    op: Operation,
    started: Instant,
    failure: Option<(&'static str, bool)>,
) {
    let duration_ms = started.elapsed().as_millis() as u64;
    let outcome = match failure {
        None => Outcome::Success,
        Some((_, true)) => Outcome::Canceled,
        Some((kind, false)) => {
            metrics.record_error(op, kind);
            Outcome::Failure
        }
    };
    metrics.record_completed(op, outcome, duration_ms);
}
