//! Prometheus backend for the claim operation metrics of `space-core`.
//!
//! ```rust
//! use std::sync::Arc;
//! use space_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let handle: space_core::metrics::MetricsHandle = Arc::new(metrics.clone());
//! // hand `handle` to the controller or node agent, serve `metrics.encode_text()`
//! let _ = (handle, metrics.encode_text()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `space_dra_operations_started_total{operation}`
//! - `space_dra_operations_completed_total{operation, outcome}`
//! - `space_dra_operations_in_flight{operation}`
//! - `space_dra_operation_duration_seconds{operation}`
//! - `space_dra_operation_errors_total{operation, error_kind}`
mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
