use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{error, info, warn};

/// One summary line per request: method, uri, status, elapsed time.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed = start.elapsed();

    if status.is_server_error() {
        error!(method = %method, uri = %uri, status = %status, elapsed = ?elapsed, "request failed");
    } else if status.is_client_error() {
        warn!(method = %method, uri = %uri, status = %status, elapsed = ?elapsed, "request rejected");
    } else {
        info!(method = %method, uri = %uri, status = %status, elapsed = ?elapsed, "request processed");
    }

    response
}
