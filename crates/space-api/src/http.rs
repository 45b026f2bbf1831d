use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
};
use space_prometheus::PrometheusMetrics;
use tokio_util::sync::CancellationToken;

use crate::error::ApiError;

const TEXT_FORMAT: &str = "text/plain; version=0.0.4";

/// Operational HTTP endpoints of the node agent.
pub struct OpsApi {
    shutdown: CancellationToken,
    metrics: Option<PrometheusMetrics>,
}

impl OpsApi {
    /// `/healthz` reports unavailable once `shutdown` is cancelled.
    pub fn new(shutdown: CancellationToken) -> Self {
        Self {
            shutdown,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: PrometheusMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build axum router with mounted endpoints.
    ///
    /// Routes:
    /// - GET /healthz - Liveness
    /// - GET /metrics - Prometheus text exposition
    pub fn router(self) -> Router {
        Router::new()
            .route("/healthz", get(healthz))
            .route("/metrics", get(metrics))
            .with_state(Arc::new(self))
    }
}

/// GET /healthz
async fn healthz(State(ops): State<Arc<OpsApi>>) -> Result<&'static str, ApiError> {
    if ops.shutdown.is_cancelled() {
        return Err(ApiError::ShuttingDown);
    }
    Ok("ok")
}

/// GET /metrics
async fn metrics(State(ops): State<Arc<OpsApi>>) -> Result<impl IntoResponse, ApiError> {
    let Some(metrics) = &ops.metrics else {
        return Err(ApiError::NotFound("metrics are disabled".into()));
    };
    let body = metrics
        .encode_text()
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(([(header::CONTENT_TYPE, TEXT_FORMAT)], body))
}
