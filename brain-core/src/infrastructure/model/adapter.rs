//! Message adapters - convert between different API formats

use super::types::ToolSchema;
use crate::types::{ChatMessage, MessageRole, ToolCallRequest};
use serde_json::{Value, json};

/// Adapter for converting messages to different API formats
pub struct MessageAdapter;

impl MessageAdapter {
    /// Convert messages to Anthropic Messages format
    /// Returns: (system_text, messages)
    ///
    /// System messages are hoisted into the top-level system text. Tool
    /// results become `tool_result` blocks; consecutive results share one
    /// user turn.
    pub fn to_anthropic_format(messages: &[ChatMessage]) -> (Option<String>, Vec<Value>) {
        let mut system_parts = Vec::new();
        let mut converted: Vec<Value> = Vec::new();
        let mut open_tool_turn = false;

        for message in messages {
            match message.role {
                MessageRole::System => {
                    system_parts.push(message.content.clone());
                    continue;
                }
                MessageRole::Tool => {
                    let block = json!({
                        "type": "tool_result",
                        "tool_use_id": message.tool_call_id.clone().unwrap_or_default(),
                        "content": message.content.clone(),
                    });
                    let open_blocks = if open_tool_turn {
                        converted
                            .last_mut()
                            .and_then(|turn| turn.get_mut("content"))
                            .and_then(Value::as_array_mut)
                    } else {
                        None
                    };
                    match open_blocks {
                        Some(blocks) => blocks.push(block),
                        None => converted.push(json!({ "role": "user", "content": [block] })),
                    }
                    open_tool_turn = true;
                    continue;
                }
                MessageRole::User => {
                    converted.push(json!({ "role": "user", "content": message.content.clone() }));
                }
                MessageRole::Assistant if message.has_tool_calls() => {
                    let mut blocks = Vec::new();
                    if !message.content.is_empty() {
                        blocks.push(json!({ "type": "text", "text": message.content.clone() }));
                    }
                    for call in &message.tool_calls {
                        blocks.push(json!({
                            "type": "tool_use",
                            "id": call.id.clone(),
                            "name": call.name.clone(),
                            "input": object_or_empty(&call.arguments),
                        }));
                    }
                    converted.push(json!({ "role": "assistant", "content": blocks }));
                }
                MessageRole::Assistant => {
                    converted.push(json!({
                        "role": "assistant",
                        "content": message.content.clone()
                    }));
                }
            }
            open_tool_turn = false;
        }

        let system = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n\n"))
        };
        (system, converted)
    }

    pub fn anthropic_tools(tools: &[ToolSchema]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name.clone(),
                    "description": tool.description.clone(),
                    "input_schema": tool.parameters.clone(),
                })
            })
            .collect()
    }

    /// Convert messages to Ollama chat format
    /// Returns: [{"role": "...", "content": "...", "tool_calls": [...]}]
    pub fn to_ollama_format(messages: &[ChatMessage]) -> Vec<Value> {
        messages
            .iter()
            .map(|msg| {
                let mut value = json!({
                    "role": msg.role.as_str(),
                    "content": msg.content.clone()
                });
                if msg.has_tool_calls() {
                    value["tool_calls"] = Value::Array(
                        msg.tool_calls
                            .iter()
                            .map(|call| {
                                json!({
                                    "function": {
                                        "name": call.name.clone(),
                                        "arguments": object_or_empty(&call.arguments),
                                    }
                                })
                            })
                            .collect(),
                    );
                }
                value
            })
            .collect()
    }

    pub fn ollama_tools(tools: &[ToolSchema]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name.clone(),
                        "description": tool.description.clone(),
                        "parameters": tool.parameters.clone(),
                    }
                })
            })
            .collect()
    }

    /// Ollama omits call ids, so number them within the response.
    pub fn ollama_tool_calls(calls: Vec<(String, Value)>) -> Vec<ToolCallRequest> {
        calls
            .into_iter()
            .enumerate()
            .map(|(idx, (name, arguments))| ToolCallRequest::new(format!("call_{idx}"), name, arguments))
            .collect()
    }
}

fn object_or_empty(arguments: &Value) -> Value {
    match arguments {
        Value::Null => json!({}),
        other => other.clone(),
    }
}
