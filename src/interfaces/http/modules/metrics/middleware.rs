//! Per-operation HTTP metrics
//!
//! Requests are labelled with the workflow operation they invoke
//! (`berthing/approve`, `customs/update_status`, ...) rather than the raw
//! path, so ids never reach a label. Error responses carry an
//! [`ErrorCode`] extension set by the error envelope, which feeds a
//! rejection counter per taxonomy code.

use std::time::Instant;

use axum::{
    body::Body,
    http::{Method, Request},
    middleware::Next,
    response::Response,
};

use crate::interfaces::http::common::ErrorCode;

/// Records
/// - `http_requests_total{resource, operation, status}`
/// - `http_request_duration_seconds{resource, operation}`
/// - `http_request_rejections_total{resource, operation, code}` for error envelopes
pub async fn http_metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let (resource, operation) = operation_of(request.method(), request.uri().path());

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed().as_secs_f64();

    let status = response.status().as_u16().to_string();
    metrics::counter!(
        "http_requests_total",
        "resource" => resource,
        "operation" => operation,
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "http_request_duration_seconds",
        "resource" => resource,
        "operation" => operation
    )
    .record(elapsed);

    if let Some(ErrorCode(code)) = response.extensions().get::<ErrorCode>().copied() {
        metrics::counter!(
            "http_request_rejections_total",
            "resource" => resource,
            "operation" => operation,
            "code" => code
        )
        .increment(1);
    }

    response
}

/// `(resource, operation)` for a request; `("other", "unmatched")` for
/// anything outside the route table.
pub fn operation_of(method: &Method, path: &str) -> (&'static str, &'static str) {
    const UNMATCHED: (&str, &str) = ("other", "unmatched");

    let trimmed = path.trim_end_matches('/');
    match trimmed {
        "/health" => return ("ops", "health"),
        "/metrics" => return ("ops", "metrics"),
        _ => {}
    }
    if trimmed.starts_with("/docs") || trimmed.starts_with("/api-doc") {
        return ("ops", "docs");
    }
    let Some(rest) = trimmed.strip_prefix("/api/v1/") else {
        return UNMATCHED;
    };
    let segments: Vec<&str> = rest.split('/').collect();

    match (segments.as_slice(), method.as_str()) {
        (["ships"], "GET") => ("ship", "list"),
        (["ships"], "POST") => ("ship", "register"),
        (["ships", _], "GET") => ("ship", "get"),

        (["docks"], "GET") => ("dock", "list"),
        (["docks"], "POST") => ("dock", "register"),
        (["docks", _], "GET") => ("dock", "get"),
        (["docks", _], "DELETE") => ("dock", "delete"),
        (["docks", _, "maintenance"], "PUT") => ("dock", "maintenance"),

        (["berthings"], "GET") => ("berthing", "list"),
        (["berthings"], "POST") => ("berthing", "create"),
        (["berthings", _], "GET") => ("berthing", "get"),
        (["berthings", _], "PUT") => ("berthing", "update"),
        (["berthings", _], "DELETE") => ("berthing", "delete"),
        (["berthings", _, "approve"], "POST") => ("berthing", "approve"),
        (["berthings", _, "reject"], "POST") => ("berthing", "reject"),

        (["customs", "cargo"], "GET") => ("customs", "queue"),
        (["customs", "cargo", _, "status"], "PUT") => ("customs", "update_status"),
        (["customs", "cargo", _, "history"], "GET") => ("customs", "history"),

        (["notifications"], "GET") => ("notification", "list"),
        (["notifications"], "POST") => ("notification", "send"),
        (["notifications", "unread-count"], "GET") => ("notification", "unread_count"),
        (["notifications", "read-all"], "PUT") => ("notification", "mark_all_read"),
        (["notifications", "read"], "DELETE") => ("notification", "clear_read"),
        (["notifications", _, "read"], "PUT") => ("notification", "mark_read"),
        (["notifications", _], "DELETE") => ("notification", "delete"),

        _ => UNMATCHED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_routes_map_to_operations() {
        let cases = [
            (Method::POST, "/api/v1/berthings", ("berthing", "create")),
            (Method::POST, "/api/v1/berthings/b-1/approve", ("berthing", "approve")),
            (Method::POST, "/api/v1/berthings/b-1/reject/", ("berthing", "reject")),
            (Method::PUT, "/api/v1/berthings/b-1", ("berthing", "update")),
            (Method::PUT, "/api/v1/customs/cargo/c-9/status", ("customs", "update_status")),
            (Method::GET, "/api/v1/customs/cargo", ("customs", "queue")),
            (Method::PUT, "/api/v1/docks/d-2/maintenance", ("dock", "maintenance")),
            (Method::PUT, "/api/v1/notifications/read-all", ("notification", "mark_all_read")),
            (Method::PUT, "/api/v1/notifications/n-4/read", ("notification", "mark_read")),
            (Method::DELETE, "/api/v1/notifications/read", ("notification", "clear_read")),
            (Method::GET, "/health", ("ops", "health")),
            (Method::GET, "/docs/index.html", ("ops", "docs")),
        ];
        for (method, path, expected) in cases {
            assert_eq!(operation_of(&method, path), expected, "{method} {path}");
        }
    }

    #[test]
    fn unknown_paths_and_methods_share_one_label() {
        assert_eq!(
            operation_of(&Method::GET, "/api/v1/berthings/b-1/approve"),
            ("other", "unmatched")
        );
        assert_eq!(operation_of(&Method::GET, "/wp-admin"), ("other", "unmatched"));
        assert_eq!(
            operation_of(&Method::GET, "/api/v1/ships/s-1/crew/7"),
            ("other", "unmatched")
        );
    }
}
