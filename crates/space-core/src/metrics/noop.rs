use crate::metrics::backend::{MetricsBackend, Operation, Outcome};

/// Metrics backend that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_started(&self, _: Operation) {}

    #[inline(always)]
    fn record_completed(&self, _: Operation, _: Outcome, _: u64) {}

    #[inline(always)]
    fn record_error(&self, _: Operation, _: &str) {}
}
