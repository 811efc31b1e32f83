//! Ollama client implementation

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use super::base::HttpClientBase;
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::traits::ModelProvider;
use crate::infrastructure::model::types::{
    ModelError, ModelRequest, ModelResponse, ProviderSettings,
};
use crate::types::ChatMessage;

#[derive(Clone)]
pub struct OllamaClient {
    base: HttpClientBase,
    temperature: f32,
}

impl OllamaClient {
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, ModelError> {
        Ok(Self {
            base: HttpClientBase::new("ollama", settings.endpoint.clone(), None, settings.timeout)?,
            temperature: settings.temperature,
        })
    }
}

#[async_trait]
impl ModelProvider for OllamaClient {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let url = self.base.build_url("/api/chat");
        let payload = OllamaRequest {
            model: request.model.clone(),
            messages: MessageAdapter::to_ollama_format(&request.messages),
            tools: MessageAdapter::ollama_tools(&request.tools),
            stream: false,
            options: json!({ "temperature": self.temperature }),
        };

        info!(
            provider = self.base.id.as_str(),
            model = request.model.as_str(),
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending request to Ollama"
        );

        let response: OllamaResponse = self.base.post_json(&url, HeaderMap::new(), &payload).await?;
        debug!("Received response from Ollama");

        let message = response
            .message
            .ok_or_else(|| ModelError::invalid_response(&self.base.id, "missing message field"))?;
        let calls = MessageAdapter::ollama_tool_calls(
            message
                .tool_calls
                .into_iter()
                .map(|call| (call.function.name, call.function.arguments))
                .collect(),
        );

        Ok(ModelResponse::new(ChatMessage::assistant_with_tools(
            message.content,
            calls,
        )))
    }
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    stream: bool,
    options: Value,
}

#[derive(Deserialize)]
struct OllamaResponse {
    message: Option<OllamaMessage>,
}

#[derive(Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
    #[serde(default)]
    tool_calls: Vec<OllamaToolCall>,
}

#[derive(Deserialize)]
struct OllamaToolCall {
    function: OllamaFunction,
}

#[derive(Deserialize)]
struct OllamaFunction {
    name: String,
    #[serde(default)]
    arguments: Value,
}
