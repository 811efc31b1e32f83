use super::super::state::ServerState;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use brain_core::model::ModelProvider;
use std::sync::Arc;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "ops",
    responses((status = 200, description = "Prometheus text exposition", body = String))
)]
pub async fn metrics_handler<P: ModelProvider>(
    State(state): State<Arc<ServerState<P>>>,
) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        state.metrics.render(),
    )
}
