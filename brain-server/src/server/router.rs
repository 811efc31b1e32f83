use super::docs::ApiDoc;
use super::error::ServerError;
use super::middleware::track_requests;
use super::routes;
use super::state::ServerState;
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use brain_core::model::ModelProvider;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;

pub fn build_router<P>(state: Arc<ServerState<P>>) -> Router
where
    P: ModelProvider + 'static,
{
    Router::new()
        .route("/health", get(routes::health::health_handler::<P>))
        .route("/chat", post(routes::chat::chat_handler::<P>))
        .route(
            "/reset-session",
            post(routes::chat::reset_session_handler::<P>),
        )
        .route("/metrics", get(routes::metrics::metrics_handler::<P>))
        .route(
            "/api-doc/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            track_requests::<P>,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` resolves, letting in-flight requests finish.
pub async fn serve<P, S>(
    state: Arc<ServerState<P>>,
    addr: SocketAddr,
    shutdown: S,
) -> Result<(), ServerError>
where
    P: ModelProvider + 'static,
    S: Future<Output = ()> + Send + 'static,
{
    info!(%addr, "Binding brain server");
    let app = build_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(%addr, "Brain server ready to accept connections");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)
}
