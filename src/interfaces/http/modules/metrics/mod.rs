//! Prometheus scrape endpoint and per-operation request metrics

pub mod handlers;
pub mod middleware;

pub use handlers::*;
pub use middleware::{http_metrics_middleware, operation_of};
