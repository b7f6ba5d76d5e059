use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Log one line per request: id, method, path, status, latency.
/// Bodies are never logged.
pub async fn request_logger(request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let span = tracing::info_span!("request", %request_id, %method, %path);

    let started = Instant::now();
    let response = next.run(request).instrument(span.clone()).await;

    tracing::info!(
        parent: &span,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request completed"
    );
    response
}
