use std::time::Instant;

use axum::{middleware::Next, response::Response};

/// Log one line per request with its outcome and latency.
pub async fn log_requests(req: axum::http::Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if status.is_success() {
        tracing::info!(%method, %path, status = status.as_u16(), elapsed_ms, "request");
    } else {
        tracing::warn!(%method, %path, status = status.as_u16(), elapsed_ms, "request");
    }
    response
}
