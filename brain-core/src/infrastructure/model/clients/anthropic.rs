//! Anthropic Messages API client

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::base::HttpClientBase;
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::traits::ModelProvider;
use crate::infrastructure::model::types::{
    ModelError, ModelRequest, ModelResponse, ProviderSettings,
};
use crate::types::{ChatMessage, ToolCallRequest};

const API_PATH: &str = "/v1/messages";
const API_VERSION: &str = "2023-06-01";

#[derive(Clone)]
pub struct AnthropicClient {
    base: HttpClientBase,
    max_tokens: u32,
    temperature: f32,
}

impl AnthropicClient {
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, ModelError> {
        Ok(Self {
            base: HttpClientBase::new(
                "anthropic",
                settings.endpoint.clone(),
                settings.api_key.clone(),
                settings.timeout,
            )?,
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        })
    }

    fn headers(&self) -> Result<HeaderMap, ModelError> {
        let api_key = self.base.require_api_key()?;
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key)
            .map_err(|_| ModelError::missing_api_key(&self.base.id))?;
        headers.insert("x-api-key", key);
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }
}

#[async_trait]
impl ModelProvider for AnthropicClient {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let url = self.base.build_url(API_PATH);
        let (system, messages) = MessageAdapter::to_anthropic_format(&request.messages);

        let payload = AnthropicRequest {
            model: request.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system,
            messages,
            tools: MessageAdapter::anthropic_tools(&request.tools),
        };

        info!(
            provider = self.base.id.as_str(),
            model = request.model.as_str(),
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending request to Anthropic"
        );

        let response: AnthropicResponse =
            self.base.post_json(&url, self.headers()?, &payload).await?;
        debug!(stop_reason = response.stop_reason.as_deref(), "Received response from Anthropic");

        Ok(ModelResponse::new(response.into_message()))
    }
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Other,
}

impl AnthropicResponse {
    fn into_message(self) -> ChatMessage {
        let mut text = String::new();
        let mut calls = Vec::new();
        for block in self.content {
            match block {
                ContentBlock::Text { text: part } => text.push_str(&part),
                ContentBlock::ToolUse { id, name, input } => {
                    calls.push(ToolCallRequest::new(id, name, input))
                }
                ContentBlock::Other => {}
            }
        }
        ChatMessage::assistant_with_tools(text, calls)
    }
}
