use crate::application::retry::Retryable;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolInvokeError {
    #[error("Unknown MCP server: {server}")]
    UnknownServer { server: String },
    #[error("MCP server '{server}' is configured more than once")]
    DuplicateServer { server: String },
    #[error("MCP server '{server}' has an invalid address: {reason}")]
    InvalidEndpoint { server: String, reason: String },
    #[error("failed to build HTTP client for tool servers: {0}")]
    Client(#[source] reqwest::Error),
    #[error("MCP server '{server}' transport error: {source}")]
    Transport {
        server: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("MCP server '{server}' responded with HTTP {status}: {body}")]
    Status {
        server: String,
        status: u16,
        body: String,
    },
    #[error("MCP server '{server}' returned an invalid payload: {source}")]
    InvalidResponse {
        server: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ToolInvokeError {
    pub fn transport(server: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            server: server.into(),
            source,
        }
    }

    pub fn invalid_response(server: impl Into<String>, source: reqwest::Error) -> Self {
        Self::InvalidResponse {
            server: server.into(),
            source,
        }
    }
}

// Only request-level failures are transient. A server that answered with a
// non-success status (including 5xx) is reported once.
impl Retryable for ToolInvokeError {
    fn is_retryable(&self) -> bool {
        match self {
            ToolInvokeError::Transport { .. } => true,
            ToolInvokeError::InvalidResponse { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}
