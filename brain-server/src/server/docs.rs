use super::dto::{
    ChatRequestBody, ChatResponseBody, ComponentHealth, ErrorResponse, HealthComponents,
    HealthResponse, HealthStatus, McpServersHealth, ResetResponse, ServerHealth,
};
use super::routes;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::chat::chat_handler,
        routes::chat::reset_session_handler,
        routes::health::health_handler,
        routes::metrics::metrics_handler
    ),
    components(
        schemas(
            ChatRequestBody,
            ChatResponseBody,
            ResetResponse,
            ErrorResponse,
            HealthResponse,
            HealthComponents,
            HealthStatus,
            ComponentHealth,
            McpServersHealth,
            ServerHealth
        )
    ),
    tags(
        (name = "chat", description = "Chat with the assistant"),
        (name = "ops", description = "Health and metrics")
    )
)]
pub struct ApiDoc;
