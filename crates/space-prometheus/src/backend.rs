use std::sync::Arc;

use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, IntGaugeVec, Opts, Registry, TextEncoder,
    proto::MetricFamily,
};
use space_core::metrics::{MetricsBackend, Operation, Outcome};

const NAMESPACE: &str = "space_dra";

/// Prometheus implementation of [`MetricsBackend`].
///
/// Labels are bounded: `operation` is one of allocate/deallocate/prepare/unprepare,
/// `outcome` one of success/failure/canceled, `error_kind` a fixed error label.
#[derive(Clone)]
pub struct PrometheusMetrics {
    started: CounterVec,
    completed: CounterVec,
    in_flight: IntGaugeVec,
    duration: HistogramVec,
    errors: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let started = CounterVec::new(
            Opts::new("operations_started_total", "Claim operations entered").namespace(NAMESPACE),
            &["operation"],
        )?;
        registry.register(Box::new(started.clone()))?;

        let completed = CounterVec::new(
            Opts::new("operations_completed_total", "Claim operations returned")
                .namespace(NAMESPACE),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(completed.clone()))?;

        let in_flight = IntGaugeVec::new(
            Opts::new("operations_in_flight", "Claim operations currently running")
                .namespace(NAMESPACE),
            &["operation"],
        )?;
        registry.register(Box::new(in_flight.clone()))?;

        let duration = HistogramVec::new(
            HistogramOpts::new(
                "operation_duration_seconds",
                "Claim operation duration, lock wait included",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 60.0]),
            &["operation"],
        )?;
        registry.register(Box::new(duration.clone()))?;

        let errors = CounterVec::new(
            Opts::new("operation_errors_total", "Failed claim operations by error kind")
                .namespace(NAMESPACE),
            &["operation", "error_kind"],
        )?;
        registry.register(Box::new(errors.clone()))?;

        Ok(Self {
            started,
            completed,
            in_flight,
            duration,
            errors,
            registry,
        })
    }

    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Text exposition format, as served on `/metrics`.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_started(&self, op: Operation) {
        self.started.with_label_values(&[op.as_label()]).inc();
        self.in_flight.with_label_values(&[op.as_label()]).inc();
    }

    fn record_completed(&self, op: Operation, outcome: Outcome, duration_ms: u64) {
        self.completed
            .with_label_values(&[op.as_label(), outcome.as_label()])
            .inc();
        self.in_flight.with_label_values(&[op.as_label()]).dec();
        self.duration
            .with_label_values(&[op.as_label()])
            .observe(duration_ms as f64 / 1000.0);
    }

    fn record_error(&self, op: Operation, error_kind: &str) {
        self.errors
            .with_label_values(&[op.as_label(), error_kind])
            .inc();
    }
}
