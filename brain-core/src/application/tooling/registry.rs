use super::error::ToolInvokeError;
use super::interface::{ToolDescriptor, ToolServerInterface, empty_object_schema};
use crate::application::retry::RetryPolicy;
use crate::infrastructure::metrics::Metrics;
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

const DISCOVERY_SEGMENT: &str = "tools";
const INVOCATION_SEGMENT: &str = "call";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A named tool server. The discovery and invocation addresses are derived
/// once from the base address by replacing its final path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoint {
    pub name: String,
    pub base_address: Url,
    discovery_url: Url,
    invocation_url: Url,
}

impl ServerEndpoint {
    pub fn new(name: impl Into<String>, base_address: &str) -> Result<Self, ToolInvokeError> {
        let name = name.into();
        let base_address =
            Url::parse(base_address).map_err(|err| ToolInvokeError::InvalidEndpoint {
                server: name.clone(),
                reason: err.to_string(),
            })?;
        let discovery_url = replace_last_segment(&name, &base_address, DISCOVERY_SEGMENT)?;
        let invocation_url = replace_last_segment(&name, &base_address, INVOCATION_SEGMENT)?;
        Ok(Self {
            name,
            base_address,
            discovery_url,
            invocation_url,
        })
    }

    pub fn discovery_url(&self) -> &Url {
        &self.discovery_url
    }

    pub fn invocation_url(&self) -> &Url {
        &self.invocation_url
    }
}

fn replace_last_segment(server: &str, base: &Url, segment: &str) -> Result<Url, ToolInvokeError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ToolInvokeError::InvalidEndpoint {
            server: server.to_string(),
            reason: format!("'{base}' cannot carry a path"),
        })?
        .pop_if_empty()
        .pop()
        .push(segment);
    Ok(url)
}

#[derive(Debug, Clone)]
pub struct RegistryOptions {
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::network(),
        }
    }
}

/// Per-server tool count, `None` when the server was never discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerToolCount {
    pub server: String,
    pub tool_count: Option<usize>,
}

#[derive(Default)]
struct RegistryState {
    tools_by_server: HashMap<String, Vec<ToolDescriptor>>,
    connected: HashSet<String>,
    merged: Option<Arc<[ToolDescriptor]>>,
}

impl RegistryState {
    fn replace(&mut self, server: &str, tools: Vec<ToolDescriptor>) {
        self.merged = None;
        self.tools_by_server.insert(server.to_string(), tools);
    }

    /// Store a discovery outcome; `None` leaves the server with no tools.
    fn record_discovery(&mut self, server: &str, tools: Option<Vec<ToolDescriptor>>) {
        match tools {
            Some(tools) => {
                self.connected.insert(server.to_string());
                self.replace(server, tools);
            }
            None => {
                self.connected.remove(server);
                self.replace(server, Vec::new());
            }
        }
    }
}

/// Records one tool call when dropped, so a cancelled call is still counted
/// as an error with the time spent so far.
struct ToolCallTimer<'a> {
    metrics: &'a Metrics,
    server: &'a str,
    tool: &'a str,
    started: Instant,
    status: &'static str,
}

impl<'a> ToolCallTimer<'a> {
    fn start(metrics: &'a Metrics, server: &'a str, tool: &'a str) -> Self {
        Self {
            metrics,
            server,
            tool,
            started: Instant::now(),
            status: "error",
        }
    }

    fn succeeded(&mut self) {
        self.status = "success";
    }
}

impl Drop for ToolCallTimer<'_> {
    fn drop(&mut self) {
        self.metrics
            .record_tool_call(self.server, self.tool, self.status, self.started.elapsed());
    }
}

/// Discovers, caches and invokes tools exposed by a fixed set of servers.
///
/// The merged tool list is rebuilt lazily on the first read after any write
/// to the per-server lists; both live behind one lock so readers never see a
/// half-built list.
pub struct ToolRegistry {
    servers: Vec<ServerEndpoint>,
    http: Client,
    retry: RetryPolicy,
    metrics: Arc<Metrics>,
    state: RwLock<RegistryState>,
}

impl ToolRegistry {
    pub fn new(servers: Vec<ServerEndpoint>) -> Result<Self, ToolInvokeError> {
        Self::with_options(servers, RegistryOptions::default(), Arc::new(Metrics::new()))
    }

    pub fn with_options(
        servers: Vec<ServerEndpoint>,
        options: RegistryOptions,
        metrics: Arc<Metrics>,
    ) -> Result<Self, ToolInvokeError> {
        let mut seen = HashSet::new();
        for server in &servers {
            if !seen.insert(server.name.as_str()) {
                return Err(ToolInvokeError::DuplicateServer {
                    server: server.name.clone(),
                });
            }
        }
        let http = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(ToolInvokeError::Client)?;
        Ok(Self {
            servers,
            http,
            retry: options.retry,
            metrics,
            state: RwLock::new(RegistryState::default()),
        })
    }

    fn server(&self, name: &str) -> Option<&ServerEndpoint> {
        self.servers.iter().find(|server| server.name == name)
    }

    /// Rediscover every server. A server that cannot be reached ends up with
    /// an empty tool list; the others are unaffected.
    pub async fn connect_all(&self) {
        self.state.write().await.merged = None;

        let discoveries = join_all(self.servers.iter().map(|server| async move {
            let outcome = self.fetch_server_tools(server).await;
            (server, outcome)
        }))
        .await;

        let mut state = self.state.write().await;
        for (server, outcome) in discoveries {
            match &outcome {
                Some(tools) => info!(
                    server = %server.name,
                    url = %server.base_address,
                    tool_count = tools.len(),
                    "Connected to MCP server"
                ),
                None => warn!(
                    server = %server.name,
                    url = %server.base_address,
                    "Failed to connect to MCP server"
                ),
            }
            state.record_discovery(&server.name, outcome);
        }
        let connected = state.connected.len() as u64;
        drop(state);
        self.metrics.set_servers_connected(connected);
    }

    /// Rediscover a single server's tools.
    pub async fn discover(&self, server_name: &str) -> Result<(), ToolInvokeError> {
        let server = self
            .server(server_name)
            .ok_or_else(|| ToolInvokeError::UnknownServer {
                server: server_name.to_string(),
            })?;
        let outcome = self.fetch_server_tools(server).await;
        let mut state = self.state.write().await;
        state.record_discovery(&server.name, outcome);
        let connected = state.connected.len() as u64;
        drop(state);
        self.metrics.set_servers_connected(connected);
        Ok(())
    }

    /// Fetch a server's tool list, retried. Returns `None` when discovery
    /// failed for any reason; never propagates the error.
    async fn fetch_server_tools(&self, server: &ServerEndpoint) -> Option<Vec<ToolDescriptor>> {
        let outcome = self
            .retry
            .run("discover_tools", || self.request_tool_list(server))
            .await;
        match outcome {
            Ok(tools) => Some(tools),
            Err(ToolInvokeError::Status { status, body, .. }) => {
                warn!(
                    server = %server.name,
                    status,
                    body = %body,
                    "Tool discovery returned non-success status"
                );
                None
            }
            Err(err) => {
                debug!(server = %server.name, error = %err, "Could not discover tools");
                None
            }
        }
    }

    async fn request_tool_list(
        &self,
        server: &ServerEndpoint,
    ) -> Result<Vec<ToolDescriptor>, ToolInvokeError> {
        let response = self
            .http
            .get(server.discovery_url().clone())
            .send()
            .await
            .map_err(|source| ToolInvokeError::transport(&server.name, source))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolInvokeError::Status {
                server: server.name.clone(),
                status: status.as_u16(),
                body,
            });
        }
        let payload: DiscoveryResponse = response
            .json()
            .await
            .map_err(|source| ToolInvokeError::invalid_response(&server.name, source))?;
        Ok(payload
            .tools
            .into_iter()
            .map(|tool| tool.into_descriptor(&server.name))
            .collect())
    }

    /// Every discovered tool, in server order then advertised order.
    pub async fn get_available_tools(&self) -> Arc<[ToolDescriptor]> {
        if let Some(cached) = self.state.read().await.merged.clone() {
            return cached;
        }
        let mut state = self.state.write().await;
        if let Some(cached) = state.merged.clone() {
            return cached;
        }
        let merged: Arc<[ToolDescriptor]> = self
            .servers
            .iter()
            .filter_map(|server| state.tools_by_server.get(&server.name))
            .flatten()
            .cloned()
            .collect();
        debug!(tool_count = merged.len(), "Rebuilt merged tool cache");
        state.merged = Some(Arc::clone(&merged));
        merged
    }

    pub async fn server_tool_counts(&self) -> Vec<ServerToolCount> {
        let state = self.state.read().await;
        self.servers
            .iter()
            .map(|server| ServerToolCount {
                server: server.name.clone(),
                tool_count: state.tools_by_server.get(&server.name).map(Vec::len),
            })
            .collect()
    }

    pub async fn call_tool(
        &self,
        server_name: &str,
        tool_name: &str,
        arguments: Value,
    ) -> Result<Value, ToolInvokeError> {
        let server = self
            .server(server_name)
            .ok_or_else(|| ToolInvokeError::UnknownServer {
                server: server_name.to_string(),
            })?;
        let arguments = match arguments {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        let mut timer = ToolCallTimer::start(&self.metrics, &server.name, tool_name);
        let result = self
            .retry
            .run("call_tool", || self.post_tool_call(server, tool_name, &arguments))
            .await;

        match &result {
            Ok(_) => timer.succeeded(),
            Err(err) => error!(
                server = %server.name,
                tool = tool_name,
                error = %err,
                "Failed to call tool"
            ),
        }
        result
    }

    async fn post_tool_call(
        &self,
        server: &ServerEndpoint,
        tool_name: &str,
        arguments: &Value,
    ) -> Result<Value, ToolInvokeError> {
        let payload = json!({ "tool": tool_name, "arguments": arguments });
        let response = self
            .http
            .post(server.invocation_url().clone())
            .json(&payload)
            .send()
            .await
            .map_err(|source| ToolInvokeError::transport(&server.name, source))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolInvokeError::Status {
                server: server.name.clone(),
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .await
            .map_err(|source| ToolInvokeError::invalid_response(&server.name, source))
    }

    #[cfg(test)]
    async fn overwrite_server_tools_unchecked(&self, server: &str, tools: Vec<ToolDescriptor>) {
        self.state
            .write()
            .await
            .tools_by_server
            .insert(server.to_string(), tools);
    }
}

#[async_trait]
impl ToolServerInterface for ToolRegistry {
    async fn available_tools(&self) -> Arc<[ToolDescriptor]> {
        self.get_available_tools().await
    }

    async fn invoke_tool(
        &self,
        server: &str,
        tool: &str,
        arguments: Value,
    ) -> Result<Value, ToolInvokeError> {
        self.call_tool(server, tool, arguments).await
    }
}

#[derive(Debug, Deserialize)]
struct DiscoveryResponse {
    #[serde(default)]
    tools: Vec<AdvertisedTool>,
}

#[derive(Debug, Deserialize)]
struct AdvertisedTool {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, rename = "inputSchema")]
    input_schema: Option<Value>,
}

impl AdvertisedTool {
    fn into_descriptor(self, server: &str) -> ToolDescriptor {
        ToolDescriptor::new(
            self.name,
            self.description.unwrap_or_default(),
            self.input_schema.unwrap_or_else(empty_object_schema),
            server,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;

    fn fast_options() -> RegistryOptions {
        RegistryOptions {
            timeout: Duration::from_millis(300),
            retry: RetryPolicy::immediate(2),
        }
    }

    fn registry_for(servers: Vec<ServerEndpoint>) -> (ToolRegistry, Arc<Metrics>) {
        let metrics = Arc::new(Metrics::new());
        let registry = ToolRegistry::with_options(servers, fast_options(), Arc::clone(&metrics))
            .expect("registry builds");
        (registry, metrics)
    }

    fn tool(name: &str, server: &str) -> ToolDescriptor {
        ToolDescriptor::new(name, "", empty_object_schema(), server)
    }

    #[test]
    fn endpoints_replace_final_path_segment() {
        let server = ServerEndpoint::new("fs", "http://localhost:8001/sse").expect("valid");
        assert_eq!(server.discovery_url().as_str(), "http://localhost:8001/tools");
        assert_eq!(server.invocation_url().as_str(), "http://localhost:8001/call");

        let nested = ServerEndpoint::new("nested", "http://host/mcp/fs/sse/").expect("valid");
        assert_eq!(nested.discovery_url().as_str(), "http://host/mcp/fs/tools");
    }

    #[test]
    fn rejects_unparseable_address() {
        let err = ServerEndpoint::new("bad", "not a url").expect_err("invalid");
        assert!(matches!(err, ToolInvokeError::InvalidEndpoint { .. }));
    }

    #[test]
    fn rejects_duplicate_server_names() {
        let a = ServerEndpoint::new("fs", "http://a/sse").expect("valid");
        let b = ServerEndpoint::new("fs", "http://b/sse").expect("valid");
        let err = ToolRegistry::new(vec![a, b]).err().expect("duplicate rejected");
        assert!(matches!(err, ToolInvokeError::DuplicateServer { .. }));
    }

    #[tokio::test]
    async fn partial_discovery_keeps_reachable_servers() {
        let fs = MockServer::start_async().await;
        let fs_mock = fs
            .mock_async(|when, then| {
                when.method(GET).path("/tools");
                then.status(200).json_body(json!({
                    "tools": [{
                        "name": "read_file",
                        "description": "Read a file",
                        "inputSchema": {"type": "object", "properties": {"path": {"type": "string"}}}
                    }]
                }));
            })
            .await;
        let shell = MockServer::start_async().await;
        shell
            .mock_async(|when, then| {
                when.method(GET).path("/tools");
                then.status(200)
                    .delay(Duration::from_secs(2))
                    .json_body(json!({"tools": [{"name": "run"}]}));
            })
            .await;

        let (registry, metrics) = registry_for(vec![
            ServerEndpoint::new("fs", &fs.url("/sse")).expect("valid"),
            ServerEndpoint::new("shell", &shell.url("/sse")).expect("valid"),
        ]);
        registry.connect_all().await;

        let tools = registry.get_available_tools().await;
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "read_file");
        assert_eq!(tools[0].owning_server, "fs");
        assert_eq!(tools[0].description, "Read a file");

        let counts = registry.server_tool_counts().await;
        assert_eq!(
            counts,
            vec![
                ServerToolCount {
                    server: "fs".into(),
                    tool_count: Some(1)
                },
                ServerToolCount {
                    server: "shell".into(),
                    tool_count: Some(0)
                },
            ]
        );
        assert_eq!(metrics.servers_connected(), 1);
        fs_mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_discovery_yields_empty_list() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/tools");
                then.status(503).body("down");
            })
            .await;

        let (registry, _) =
            registry_for(vec![ServerEndpoint::new("todo", &server.url("/sse")).expect("valid")]);
        registry.connect_all().await;

        assert!(registry.get_available_tools().await.is_empty());
        assert_eq!(registry.server_tool_counts().await[0].tool_count, Some(0));
    }

    #[tokio::test]
    async fn merged_list_preserves_server_and_tool_order() {
        let (registry, _) = registry_for(vec![
            ServerEndpoint::new("b", "http://127.0.0.1:1/sse").expect("valid"),
            ServerEndpoint::new("a", "http://127.0.0.1:2/sse").expect("valid"),
        ]);
        {
            let mut state = registry.state.write().await;
            state.replace("a", vec![tool("a1", "a")]);
            state.replace("b", vec![tool("b1", "b"), tool("b2", "b")]);
        }

        let names: Vec<_> = registry
            .get_available_tools()
            .await
            .iter()
            .map(|tool| tool.name.clone())
            .collect();
        assert_eq!(names, vec!["b1", "b2", "a1"]);
    }

    #[tokio::test]
    async fn cached_list_is_returned_until_invalidated() {
        let (registry, _) =
            registry_for(vec![ServerEndpoint::new("fs", "http://127.0.0.1:1/sse").expect("valid")]);
        registry
            .state
            .write()
            .await
            .replace("fs", vec![tool("read_file", "fs")]);

        let first = registry.get_available_tools().await;
        registry
            .overwrite_server_tools_unchecked(
                "fs",
                vec![tool("read_file", "fs"), tool("write_file", "fs")],
            )
            .await;
        let second = registry.get_available_tools().await;

        assert_eq!(first, second);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn connect_all_invalidates_cache() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/tools");
                then.status(200).json_body(json!({
                    "tools": [{"name": "read_file"}, {"name": "write_file"}]
                }));
            })
            .await;
        let (registry, _) =
            registry_for(vec![ServerEndpoint::new("fs", &server.url("/sse")).expect("valid")]);
        registry
            .state
            .write()
            .await
            .replace("fs", vec![tool("read_file", "fs")]);
        assert_eq!(registry.get_available_tools().await.len(), 1);

        registry.connect_all().await;

        let tools = registry.get_available_tools().await;
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[1].name, "write_file");
        assert_eq!(tools[1].parameter_schema, empty_object_schema());
    }

    #[tokio::test]
    async fn call_tool_posts_payload_and_records_metrics() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/call")
                    .json_body(json!({"tool": "read_file", "arguments": {"path": "/etc/hosts"}}));
                then.status(200).json_body(json!({"content": "127.0.0.1 localhost"}));
            })
            .await;
        let (registry, metrics) =
            registry_for(vec![ServerEndpoint::new("fs", &server.url("/sse")).expect("valid")]);

        let result = registry
            .call_tool("fs", "read_file", json!({"path": "/etc/hosts"}))
            .await
            .expect("tool call succeeds");

        assert_eq!(result, json!({"content": "127.0.0.1 localhost"}));
        mock.assert_async().await;
        assert_eq!(metrics.tool_call_count("fs", "read_file", "success"), 1);
    }

    #[tokio::test]
    async fn call_tool_surfaces_http_errors_and_records_failure() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/call");
                then.status(500).body("kaboom");
            })
            .await;
        let (registry, metrics) =
            registry_for(vec![ServerEndpoint::new("fs", &server.url("/sse")).expect("valid")]);

        let err = registry
            .call_tool("fs", "read_file", Value::Null)
            .await
            .expect_err("server error surfaces");

        assert!(matches!(err, ToolInvokeError::Status { status: 500, .. }));
        mock.assert_hits_async(1).await;
        assert_eq!(metrics.tool_call_count("fs", "read_file", "error"), 1);
    }

    #[tokio::test]
    async fn service_unavailable_is_not_retried() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/call");
                then.status(503).body("maintenance");
            })
            .await;
        let (registry, metrics) =
            registry_for(vec![ServerEndpoint::new("ha", &server.url("/sse")).expect("valid")]);

        let err = registry
            .call_tool("ha", "turn_on", json!({"entity_id": "light.kitchen"}))
            .await
            .expect_err("status surfaces");

        assert!(matches!(err, ToolInvokeError::Status { status: 503, .. }));
        mock.assert_hits_async(1).await;
        assert_eq!(metrics.tool_call_count("ha", "turn_on", "error"), 1);
    }

    #[tokio::test]
    async fn cancelled_call_is_still_recorded() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/call");
                then.status(200)
                    .delay(Duration::from_secs(2))
                    .json_body(json!({}));
            })
            .await;
        let (registry, metrics) =
            registry_for(vec![ServerEndpoint::new("fs", &server.url("/sse")).expect("valid")]);

        let outcome = tokio::time::timeout(
            Duration::from_millis(100),
            registry.call_tool("fs", "slow", json!({})),
        )
        .await;

        assert!(outcome.is_err(), "call should have been cancelled");
        assert_eq!(metrics.tool_call_count("fs", "slow", "error"), 1);
        assert_eq!(metrics.tool_call_count("fs", "slow", "success"), 0);
    }

    #[tokio::test]
    async fn discover_rejects_unknown_server() {
        let (registry, metrics) =
            registry_for(vec![ServerEndpoint::new("fs", "http://127.0.0.1:1/sse").expect("valid")]);

        let err = registry.discover("nope").await.expect_err("unknown server");

        assert!(matches!(err, ToolInvokeError::UnknownServer { ref server } if server == "nope"));
        assert_eq!(registry.server_tool_counts().await[0].tool_count, None);
        assert_eq!(metrics.servers_connected(), 0);
    }

    #[tokio::test]
    async fn discover_replaces_one_server_and_invalidates_cache() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/tools");
                then.status(200).json_body(json!({
                    "tools": [{"name": "add_todo"}, {"name": "list_todos"}]
                }));
            })
            .await;
        let (registry, metrics) = registry_for(vec![
            ServerEndpoint::new("fs", "http://127.0.0.1:1/sse").expect("valid"),
            ServerEndpoint::new("todo", &server.url("/sse")).expect("valid"),
        ]);
        {
            let mut state = registry.state.write().await;
            state.replace("fs", vec![tool("read_file", "fs")]);
            state.replace("todo", vec![tool("stale", "todo")]);
        }
        let before = registry.get_available_tools().await;
        assert_eq!(before.len(), 2);

        registry.discover("todo").await.expect("known server");

        let names: Vec<_> = registry
            .get_available_tools()
            .await
            .iter()
            .map(|tool| tool.name.clone())
            .collect();
        assert_eq!(names, vec!["read_file", "add_todo", "list_todos"]);
        assert_eq!(metrics.servers_connected(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unknown_server_fails_without_any_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/call");
                then.status(200).json_body(json!({}));
            })
            .await;
        let (registry, metrics) =
            registry_for(vec![ServerEndpoint::new("fs", &server.url("/sse")).expect("valid")]);

        let err = registry
            .call_tool("unknown", "x", json!({}))
            .await
            .expect_err("unknown server rejected");

        assert!(matches!(err, ToolInvokeError::UnknownServer { ref server } if server == "unknown"));
        mock.assert_hits_async(0).await;
        assert_eq!(metrics.tool_call_count("unknown", "x", "error"), 0);
    }

    #[tokio::test]
    async fn transport_failures_are_retried_then_returned() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/call");
                then.status(200)
                    .delay(Duration::from_secs(2))
                    .json_body(json!({}));
            })
            .await;
        let (registry, _) =
            registry_for(vec![ServerEndpoint::new("slow", &server.url("/sse")).expect("valid")]);

        let err = registry
            .call_tool("slow", "wait", json!({}))
            .await
            .expect_err("timeout surfaces");

        match err {
            ToolInvokeError::Transport { source, .. } => assert!(source.is_timeout()),
            other => panic!("unexpected error: {other}"),
        }
        mock.assert_hits_async(2).await;
    }
}
