use super::super::dto::{
    ComponentHealth, HealthComponents, HealthResponse, HealthStatus, McpServersHealth,
    ServerHealth,
};
use super::super::state::ServerState;
use axum::Json;
use axum::extract::State;
use brain_core::model::ModelProvider;
use brain_core::tooling::ServerToolCount;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

#[utoipa::path(
    get,
    path = "/health",
    tag = "ops",
    responses((status = 200, description = "Component health", body = HealthResponse))
)]
pub async fn health_handler<P: ModelProvider>(
    State(state): State<Arc<ServerState<P>>>,
) -> Json<HealthResponse> {
    let history = match state.history.ping().await {
        Ok(()) => ComponentHealth {
            status: HealthStatus::Healthy,
            message: None,
        },
        Err(err) => {
            warn!(error = %err, "History store health check failed");
            ComponentHealth {
                status: HealthStatus::Unhealthy,
                message: Some(err.to_string()),
            }
        }
    };
    let mcp_servers = summarise_servers(state.registry.server_tool_counts().await);

    let status = if history.status == HealthStatus::Unhealthy {
        HealthStatus::Unhealthy
    } else if mcp_servers.status != HealthStatus::Healthy {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
        components: HealthComponents {
            history,
            mcp_servers,
        },
    })
}

/// A server counts as healthy once it has advertised at least one tool.
pub(crate) fn summarise_servers(counts: Vec<ServerToolCount>) -> McpServersHealth {
    let total = counts.len();
    let mut servers = BTreeMap::new();
    for count in counts {
        let health = match count.tool_count {
            Some(tools) if tools > 0 => ServerHealth {
                status: HealthStatus::Healthy,
                tool_count: Some(tools),
                message: None,
            },
            _ => ServerHealth {
                status: HealthStatus::Unhealthy,
                tool_count: None,
                message: Some("No tools available".to_string()),
            },
        };
        servers.insert(count.server, health);
    }
    let healthy = servers
        .values()
        .filter(|server| server.status == HealthStatus::Healthy)
        .count();

    let status = if healthy == total {
        HealthStatus::Healthy
    } else if healthy > 0 {
        HealthStatus::Degraded
    } else {
        HealthStatus::Unhealthy
    };

    McpServersHealth {
        status,
        healthy,
        total,
        servers,
    }
}
