use super::*;
use crate::application::retry::RetryPolicy;
use crate::application::tooling::{ToolDescriptor, ToolInvokeError, ToolServerInterface};
use crate::infrastructure::metrics::Metrics;
use crate::infrastructure::model::{ModelError, ModelProvider, ModelRequest, ModelResponse};
use crate::types::{ChatMessage, Interface, Language, MessageRole, ToolCallRequest};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
struct StubTools {
    tools: Arc<[ToolDescriptor]>,
    results: HashMap<String, Result<Value, String>>,
    invocations: Arc<Mutex<Vec<(String, String, Value)>>>,
}

impl StubTools {
    fn new(tools: Vec<ToolDescriptor>) -> Self {
        Self {
            tools: tools.into(),
            results: HashMap::new(),
            invocations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn returning(mut self, tool: &str, result: Result<Value, String>) -> Self {
        self.results.insert(tool.to_string(), result);
        self
    }

    async fn invocations(&self) -> Vec<(String, String, Value)> {
        self.invocations.lock().await.clone()
    }
}

#[async_trait]
impl ToolServerInterface for StubTools {
    async fn available_tools(&self) -> Arc<[ToolDescriptor]> {
        Arc::clone(&self.tools)
    }

    async fn invoke_tool(
        &self,
        server: &str,
        tool: &str,
        arguments: Value,
    ) -> Result<Value, ToolInvokeError> {
        self.invocations
            .lock()
            .await
            .push((server.to_string(), tool.to_string(), arguments));
        match self.results.get(tool) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(message)) => Err(ToolInvokeError::Status {
                server: server.to_string(),
                status: 500,
                body: message.clone(),
            }),
            None => Ok(Value::Null),
        }
    }
}

#[derive(Clone)]
struct ScriptedProvider {
    responses: Arc<Mutex<Vec<Result<ChatMessage, ModelError>>>>,
    recordings: Arc<Mutex<Vec<ModelRequest>>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<ChatMessage>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    fn with_results(responses: Vec<Result<ChatMessage, ModelError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            recordings: Arc::new(Mutex::new(Vec::new())),
        }
    }

    async fn requests(&self) -> Vec<ModelRequest> {
        self.recordings.lock().await.clone()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        self.recordings.lock().await.push(request);
        let mut responses = self.responses.lock().await;
        if responses.is_empty() {
            return Err(ModelError::invalid_response("scripted", "script exhausted"));
        }
        responses.remove(0).map(ModelResponse::new)
    }
}

fn read_file_tool() -> ToolDescriptor {
    ToolDescriptor::new(
        "read_file",
        "Read a file",
        json!({"type": "object", "properties": {"path": {"type": "string"}}}),
        "fs",
    )
}

fn tool_call(id: &str, name: &str, arguments: Value) -> ChatMessage {
    ChatMessage::assistant_with_tools("", vec![ToolCallRequest::new(id, name, arguments)])
}

fn agent(
    provider: ScriptedProvider,
    tools: StubTools,
) -> (Agent<ScriptedProvider>, Arc<Metrics>) {
    let metrics = Arc::new(Metrics::new());
    let options = AgentOptions {
        retry: RetryPolicy::immediate(3),
        ..AgentOptions::default()
    };
    let agent = Agent::new(provider, Arc::new(tools), Arc::clone(&metrics), options);
    (agent, metrics)
}

#[tokio::test]
async fn empty_history_sends_system_then_user() {
    let provider = ScriptedProvider::new(vec![ChatMessage::assistant("hi there")]);
    let (agent, _) = agent(provider.clone(), StubTools::new(vec![]));

    let reply = agent.chat(ChatInput::new("hello")).await;
    assert_eq!(reply, "hi there");

    let requests = provider.requests().await;
    assert_eq!(requests.len(), 1);
    let messages = &requests[0].messages;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, MessageRole::System);
    assert_eq!(messages[1].role, MessageRole::User);
    assert_eq!(messages[1].content, "hello");
}

#[tokio::test]
async fn history_is_mapped_once_and_unknown_roles_are_dropped() {
    let provider = ScriptedProvider::new(vec![ChatMessage::assistant("ok")]);
    let (agent, _) = agent(provider.clone(), StubTools::new(vec![]));
    let history = vec![
        ConversationTurn::user("first"),
        ConversationTurn::assistant("answer"),
        ConversationTurn::new("function", "ignored"),
        ConversationTurn::new("system", "inline note"),
    ];

    agent
        .chat(ChatInput::new("second").with_history(history))
        .await;

    let requests = provider.requests().await;
    let messages = &requests[0].messages;
    // 1 system + 4 turns - 1 unrecognized + 1 new message
    assert_eq!(messages.len(), 5);
    assert_eq!(messages[3].role, MessageRole::System);
    assert_eq!(messages[3].content, "inline note");
    assert_eq!(messages[4].content, "second");
}

#[tokio::test]
async fn tool_round_trip_takes_two_model_calls() {
    let provider = ScriptedProvider::new(vec![
        ChatMessage::assistant_with_tools(
            "",
            vec![
                ToolCallRequest::new("c1", "read_file", json!({"path": "/a"})),
                ToolCallRequest::new("c2", "read_file", json!({"path": "/b"})),
            ],
        ),
        ChatMessage::assistant("both files read"),
    ]);
    let tools = StubTools::new(vec![read_file_tool()])
        .returning("read_file", Ok(Value::String("contents".into())));
    let (agent, metrics) = agent(provider.clone(), tools.clone());

    let reply = agent
        .chat(ChatInput::new("read a and b").with_session("u1", "s1"))
        .await;
    assert_eq!(reply, "both files read");

    let requests = provider.requests().await;
    assert_eq!(requests.len(), 2);
    let first_len = requests[0].messages.len();
    let second = &requests[1].messages;
    // assistant turn + one result per requested call
    assert_eq!(second.len(), first_len + 3);
    let results: Vec<_> = second
        .iter()
        .filter(|m| m.role == MessageRole::Tool)
        .collect();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].tool_call_id.as_deref(), Some("c1"));
    assert_eq!(results[0].content, "contents");
    assert_eq!(results[1].tool_call_id.as_deref(), Some("c2"));

    let invocations = tools.invocations().await;
    assert_eq!(invocations.len(), 2);
    assert_eq!(invocations[0].0, "fs");
    assert_eq!(invocations[1].2, json!({"path": "/b"}));

    let rendered = metrics.render();
    assert!(rendered.contains("chat_requests_total{interface=\"api\",language=\"en\"} 1"));
}

#[tokio::test]
async fn tool_schemas_are_bound_to_every_model_call() {
    let provider = ScriptedProvider::new(vec![ChatMessage::assistant("done")]);
    let (agent, _) = agent(provider.clone(), StubTools::new(vec![read_file_tool()]));

    agent.chat(ChatInput::new("hi")).await;

    let requests = provider.requests().await;
    assert_eq!(requests[0].tools.len(), 1);
    assert_eq!(requests[0].tools[0].name, "read_file");
    assert_eq!(requests[0].model, DEFAULT_MODEL);
}

#[tokio::test]
async fn unknown_tool_yields_not_found_result() {
    let provider = ScriptedProvider::new(vec![
        tool_call("c1", "launch_rocket", json!({})),
        ChatMessage::assistant("cannot do that"),
    ]);
    let tools = StubTools::new(vec![read_file_tool()]);
    let (agent, _) = agent(provider.clone(), tools.clone());

    let reply = agent.chat(ChatInput::new("launch")).await;
    assert_eq!(reply, "cannot do that");

    let requests = provider.requests().await;
    let result = requests[1].messages.last().expect("tool result");
    assert_eq!(result.role, MessageRole::Tool);
    assert_eq!(result.content, "Error: Tool launch_rocket not found");
    assert!(tools.invocations().await.is_empty());
}

#[tokio::test]
async fn failing_tool_reports_error_text_to_model() {
    let provider = ScriptedProvider::new(vec![
        tool_call("c1", "read_file", json!({"path": "/secret"})),
        ChatMessage::assistant("it failed"),
    ]);
    let tools = StubTools::new(vec![read_file_tool()])
        .returning("read_file", Err("permission denied".into()));
    let (agent, _) = agent(provider.clone(), tools);

    let reply = agent.chat(ChatInput::new("read")).await;
    assert_eq!(reply, "it failed");

    let requests = provider.requests().await;
    let result = requests[1].messages.last().expect("tool result");
    assert!(result.content.starts_with("Error: "));
    assert!(result.content.contains("permission denied"));
}

#[tokio::test]
async fn structured_tool_results_are_serialised() {
    let provider = ScriptedProvider::new(vec![
        tool_call("c1", "read_file", Value::Null),
        ChatMessage::assistant("ok"),
    ]);
    let tools = StubTools::new(vec![read_file_tool()])
        .returning("read_file", Ok(json!({"size": 3})));
    let (agent, _) = agent(provider.clone(), tools);

    agent.chat(ChatInput::new("stat")).await;

    let requests = provider.requests().await;
    let result = requests[1].messages.last().expect("tool result");
    assert_eq!(result.content, r#"{"size":3}"#);
}

#[tokio::test]
async fn model_failure_becomes_localised_apology() {
    let provider = ScriptedProvider::with_results(vec![Err(ModelError::Status {
        provider: "scripted".into(),
        status: 400,
        body: "bad request".into(),
    })]);
    let (agent, metrics) = agent(provider.clone(), StubTools::new(vec![]));

    let reply = agent
        .chat(ChatInput::new("cześć").with_language(Language::Polish))
        .await;
    assert_eq!(reply, apology(&Language::Polish));
    // Non-retryable: exactly one attempt.
    assert_eq!(provider.requests().await.len(), 1);
    assert!(metrics
        .render()
        .contains("chat_errors_total{interface=\"api\",error_type=\"status\"} 1"));
}

#[tokio::test]
async fn rate_limited_model_call_is_retried() {
    let provider = ScriptedProvider::with_results(vec![
        Err(ModelError::RateLimited {
            provider: "scripted".into(),
        }),
        Ok(ChatMessage::assistant("second time lucky")),
    ]);
    let (agent, _) = agent(provider.clone(), StubTools::new(vec![]));

    let reply = agent.chat(ChatInput::new("hi")).await;
    assert_eq!(reply, "second time lucky");
    assert_eq!(provider.requests().await.len(), 2);
}

#[tokio::test]
async fn empty_final_text_is_replaced() {
    let provider = ScriptedProvider::new(vec![ChatMessage::assistant("")]);
    let (agent, _) = agent(provider, StubTools::new(vec![]));

    let reply = agent.chat(ChatInput::new("hi")).await;
    assert_eq!(reply, empty_response(&Language::English));
}

#[tokio::test]
async fn endless_tool_requests_hit_the_iteration_limit() {
    let script = (0..5)
        .map(|idx| tool_call(&format!("c{idx}"), "read_file", json!({})))
        .collect();
    let provider = ScriptedProvider::new(script);
    let metrics = Arc::new(Metrics::new());
    let options = AgentOptions {
        max_iterations: 2,
        retry: RetryPolicy::immediate(1),
        ..AgentOptions::default()
    };
    let agent = Agent::new(
        provider.clone(),
        Arc::new(StubTools::new(vec![read_file_tool()])),
        metrics,
        options,
    );

    let err = agent
        .run(ChatInput::new("loop"))
        .await
        .expect_err("limit reached");
    assert!(matches!(err, AgentError::IterationLimit { limit: 2 }));
    assert_eq!(provider.requests().await.len(), 3);

    let reply = agent.chat(ChatInput::new("loop")).await;
    assert_eq!(reply, apology(&Language::English));
}

#[tokio::test]
async fn voice_polish_prompt_orders_clauses() {
    let provider = ScriptedProvider::new(vec![ChatMessage::assistant("ok")]);
    let (agent, _) = agent(provider.clone(), StubTools::new(vec![]));

    agent
        .chat(
            ChatInput::new("hej")
                .with_interface(Interface::Voice)
                .with_language(Language::Polish),
        )
        .await;

    let requests = provider.requests().await;
    let system = &requests[0].messages[0].content;
    let base = system.find("You are a helpful AI assistant").expect("base");
    let voice = system.find("interacting via voice").expect("voice clause");
    let polish = system.find("Respond in Polish.").expect("polish clause");
    assert!(base < voice && voice < polish);
}
