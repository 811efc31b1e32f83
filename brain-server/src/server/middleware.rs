use super::state::ServerState;
use axum::extract::{MatchedPath, Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use brain_core::model::ModelProvider;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

pub(crate) const REQUEST_ID_HEADER: &str = "x-request-id";

/// Tags each request with an id, runs it inside a span carrying that id and
/// records the HTTP metrics.
pub(crate) async fn track_requests<P: ModelProvider>(
    State(state): State<Arc<ServerState<P>>>,
    request: Request,
    next: Next,
) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().to_string();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let span = info_span!(
        "http_request",
        request_id = request_id.as_str(),
        method = method.as_str(),
        endpoint = endpoint.as_str()
    );
    let started = Instant::now();
    let mut response = next.run(request).instrument(span.clone()).await;
    let elapsed = started.elapsed();
    let status = response.status().as_u16();

    span.in_scope(|| {
        info!(
            status,
            duration_ms = elapsed.as_millis() as u64,
            "Request completed"
        )
    });
    state
        .metrics
        .record_http_request(&method, &endpoint, status, elapsed);

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
