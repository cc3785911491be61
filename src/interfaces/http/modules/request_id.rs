//! Request correlation
//!
//! Reuses an incoming `X-Request-Id` or mints a UUID and echoes it back.
//! The rest of the stack runs inside a `request` span; the auth middleware
//! fills its `user_id` and `role` fields once the bearer token checks out,
//! so every workflow log line names the caller.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::field::Empty;
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Available to handlers as `Extension<RequestId>`
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let id = match request.headers().get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok()) {
        Some(incoming) if !incoming.trim().is_empty() => incoming.trim().to_owned(),
        _ => Uuid::new_v4().to_string(),
    };
    request.extensions_mut().insert(RequestId(id.clone()));

    let span = tracing::info_span!(
        "request",
        request_id = %id,
        method = %request.method(),
        path = %request.uri().path(),
        user_id = Empty,
        role = Empty,
    );
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = id.parse() {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::{middleware, Extension, Router};
    use tower::Service;

    fn app() -> Router {
        Router::new()
            .route("/echo", get(|Extension(RequestId(id)): Extension<RequestId>| async move { id }))
            .layer(middleware::from_fn(request_id_middleware))
    }

    async fn call(header: Option<&str>) -> (String, String) {
        let mut builder = Request::builder().uri("/echo");
        if let Some(value) = header {
            builder = builder.header(REQUEST_ID_HEADER, value);
        }
        let response = app()
            .into_service()
            .call(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let echoed = response.headers()[REQUEST_ID_HEADER].to_str().unwrap().to_owned();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (echoed, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn incoming_id_is_reused() {
        let (echoed, seen) = call(Some("berth-req-42")).await;
        assert_eq!(echoed, "berth-req-42");
        assert_eq!(seen, "berth-req-42");
    }

    #[tokio::test]
    async fn blank_id_is_replaced() {
        let (echoed, seen) = call(Some("  ")).await;
        assert_eq!(echoed, seen);
        assert!(Uuid::parse_str(&echoed).is_ok());
    }
}
