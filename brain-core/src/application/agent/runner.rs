use super::errors::AgentError;
use super::models::{AgentOptions, AgentState, ChatInput};
use super::prompt;
use super::transcript::map_history;
use crate::application::tooling::{ToolDescriptor, ToolServerInterface};
use crate::infrastructure::metrics::Metrics;
use crate::infrastructure::model::{ModelProvider, ModelRequest, ModelResponse, ToolSchema};
use crate::types::{ChatMessage, ToolCallRequest};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

enum AgentPhase {
    CallModel,
    ExecuteTools(Vec<ToolCallRequest>),
    Done(String),
}

/// Drives the model/tool alternation for one chat message at a time.
/// Holds no per-request state, so a single instance serves concurrent chats.
pub struct Agent<P: ModelProvider> {
    provider: P,
    tools: Arc<dyn ToolServerInterface>,
    metrics: Arc<Metrics>,
    options: AgentOptions,
}

impl<P: ModelProvider> Agent<P> {
    pub fn new(
        provider: P,
        tools: Arc<dyn ToolServerInterface>,
        metrics: Arc<Metrics>,
        options: AgentOptions,
    ) -> Self {
        Self {
            provider,
            tools,
            metrics,
            options,
        }
    }

    /// Always returns text. Failures are logged and turned into the
    /// language-appropriate apology.
    pub async fn chat(&self, input: ChatInput) -> String {
        let started = Instant::now();
        let interface = input.interface.clone();
        let language = input.language.clone();
        let session_id = input.session_id.clone();

        let reply = match self.run(input).await {
            Ok(reply) => reply,
            Err(err) => {
                error!(
                    session_id = session_id.as_str(),
                    interface = interface.as_str(),
                    error = %err,
                    "Agent loop failed"
                );
                self.metrics.record_chat_error(interface.as_str(), err.kind());
                err.user_message(&language)
            }
        };

        self.metrics
            .record_chat(interface.as_str(), language.as_str(), started.elapsed());
        reply
    }

    /// The loop itself; errors surface here and are absorbed by [`Agent::chat`].
    pub async fn run(&self, input: ChatInput) -> Result<String, AgentError> {
        let mut state = self.initial_state(input);
        info!(
            session_id = state.session_id.as_str(),
            user_id = state.user_id.as_str(),
            interface = state.interface.as_str(),
            messages = state.messages.len(),
            "Agent run started"
        );

        let mut iterations = 0;
        let mut phase = AgentPhase::CallModel;
        loop {
            phase = match phase {
                AgentPhase::CallModel => {
                    let message = self.call_model(&state).await?.message;
                    if !message.has_tool_calls() {
                        AgentPhase::Done(message.content)
                    } else {
                        if iterations >= self.options.max_iterations {
                            warn!(
                                session_id = state.session_id.as_str(),
                                limit = self.options.max_iterations,
                                "Model kept requesting tools past the iteration limit"
                            );
                            return Err(AgentError::IterationLimit {
                                limit: self.options.max_iterations,
                            });
                        }
                        iterations += 1;
                        let calls = message.tool_calls.clone();
                        state.messages.push(message);
                        AgentPhase::ExecuteTools(calls)
                    }
                }
                AgentPhase::ExecuteTools(calls) => {
                    let snapshot = self.tools.available_tools().await;
                    for call in calls {
                        let content = self.dispatch(&snapshot, &call, &state.session_id).await;
                        state.messages.push(ChatMessage::tool_result(call.id, content));
                    }
                    AgentPhase::CallModel
                }
                AgentPhase::Done(reply) => {
                    info!(
                        session_id = state.session_id.as_str(),
                        iterations, "Agent returned final response"
                    );
                    if reply.is_empty() {
                        return Ok(prompt::empty_response(&state.language).to_string());
                    }
                    return Ok(reply);
                }
            };
        }
    }

    fn initial_state(&self, input: ChatInput) -> AgentState {
        let mut messages = Vec::with_capacity(input.history.len() + 2);
        messages.push(ChatMessage::system(prompt::system_prompt(
            &input.interface,
            &input.language,
        )));
        messages.extend(map_history(&input.history));
        messages.push(ChatMessage::user(input.message));

        AgentState {
            messages,
            user_id: input.user_id,
            session_id: input.session_id,
            interface: input.interface,
            language: input.language,
        }
    }

    /// Tool schemas are rebuilt from the registry snapshot on every call.
    async fn call_model(&self, state: &AgentState) -> Result<ModelResponse, AgentError> {
        let snapshot = self.tools.available_tools().await;
        let request = ModelRequest {
            model: self.options.model.clone(),
            messages: state.messages.clone(),
            tools: snapshot.iter().map(ToolSchema::from).collect(),
            session_id: Some(state.session_id.clone()),
        };
        debug!(
            session_id = state.session_id.as_str(),
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Submitting turn to model provider"
        );

        let result = self
            .options
            .retry
            .run("model_call", || {
                let request = request.clone();
                async move {
                    let started = Instant::now();
                    let result = self.provider.chat(request).await;
                    self.metrics
                        .record_model_call(&self.options.model, started.elapsed());
                    result
                }
            })
            .await?;
        Ok(result)
    }

    async fn dispatch(
        &self,
        snapshot: &[ToolDescriptor],
        call: &ToolCallRequest,
        session_id: &str,
    ) -> String {
        let Some(owner) = snapshot.iter().find(|tool| tool.name == call.name) else {
            warn!(session_id, tool = call.name.as_str(), "Model requested unknown tool");
            return format!("Error: Tool {} not found", call.name);
        };

        info!(
            session_id,
            server = owner.owning_server.as_str(),
            tool = call.name.as_str(),
            "Executing tool"
        );
        match self
            .tools
            .invoke_tool(&owner.owning_server, &call.name, call.arguments.clone())
            .await
        {
            Ok(Value::String(text)) => text,
            Ok(value) => value.to_string(),
            Err(err) => {
                warn!(
                    session_id,
                    server = owner.owning_server.as_str(),
                    tool = call.name.as_str(),
                    error = %err,
                    "Tool call failed"
                );
                format!("Error: {err}")
            }
        }
    }
}
