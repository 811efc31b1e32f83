//! Model client implementations

mod anthropic;
mod base;
mod ollama;

pub use anthropic::AnthropicClient;
pub use base::HttpClientBase;
pub use ollama::OllamaClient;
