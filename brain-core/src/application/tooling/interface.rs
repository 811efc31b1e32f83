use super::error::ToolInvokeError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

/// A tool advertised by a tool server, tagged with the server that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "empty_object_schema")]
    pub parameter_schema: Value,
    pub owning_server: String,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameter_schema: Value,
        owning_server: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameter_schema,
            owning_server: owning_server.into(),
        }
    }
}

pub(crate) fn empty_object_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

/// Seam between the agent loop and whatever hosts the tools.
#[async_trait]
pub trait ToolServerInterface: Send + Sync {
    /// Current merged snapshot of every server's tools.
    async fn available_tools(&self) -> Arc<[ToolDescriptor]>;

    async fn invoke_tool(
        &self,
        server: &str,
        tool: &str,
        arguments: Value,
    ) -> Result<Value, ToolInvokeError>;
}
