//! `GET /metrics`
//!
//! Renders the process-wide Prometheus recorder. Besides the HTTP series
//! from [`super::http_metrics_middleware`] it carries the workflow series:
//! `berthing_transitions_total{transition}`, `customs_updates_total{status}`
//! and `workflow_events_total{kind}`.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

/// Shared state for the metrics endpoint
#[derive(Clone)]
pub struct MetricsState {
    pub handle: PrometheusHandle,
}

/// Unauthenticated; mounted only when the recorder could be installed
pub async fn prometheus_metrics(State(state): State<MetricsState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        state.handle.render(),
    )
}
