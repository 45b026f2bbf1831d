use std::sync::Arc;

/// Claim operation being measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Allocate,
    Deallocate,
    Prepare,
    Unprepare,
}

impl Operation {
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            Operation::Allocate => "allocate",
            Operation::Deallocate => "deallocate",
            Operation::Prepare => "prepare",
            Operation::Unprepare => "unprepare",
        }
    }
}

/// How a claim operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    Canceled,
}

impl Outcome {
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
            Outcome::Canceled => "canceled",
        }
    }
}

/// Metrics collection interface used by the controller and the node agent.
pub trait MetricsBackend: Send + Sync + 'static {
    /// A claim operation was entered (before the claim lock is taken).
    fn record_started(&self, op: Operation);

    /// A claim operation returned.
    ///
    /// `duration_ms` includes time spent waiting for the claim lock.
    fn record_completed(&self, op: Operation, outcome: Outcome, duration_ms: u64);

    /// A claim operation failed; `error_kind` is a short, low-cardinality label.
    fn record_error(&self, op: Operation, error_kind: &str);
}

/// Shared handle to a metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
