use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use utoipa::ToSchema;

fn default_interface() -> String {
    "api".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequestBody {
    pub message: String,
    /// `voice`, `telegram` or `api`.
    #[serde(default = "default_interface")]
    pub interface: String,
    /// `pl` or `en`.
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatResponseBody {
    pub response: String,
    #[schema(value_type = Vec<Object>)]
    pub actions: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResetResponse {
    pub status: String,
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub components: HealthComponents,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthComponents {
    pub history: ComponentHealth,
    pub mcp_servers: McpServersHealth,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct McpServersHealth {
    pub status: HealthStatus,
    pub healthy: usize,
    pub total: usize,
    pub servers: BTreeMap<String, ServerHealth>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServerHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
