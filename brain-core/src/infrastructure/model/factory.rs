//! Provider factory - creates clients from settings

use super::clients::{AnthropicClient, OllamaClient};
use super::traits::ModelProvider;
use super::types::{ModelError, ProviderKind, ProviderSettings};

/// Factory for creating model clients from provider settings.
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create(settings: &ProviderSettings) -> Result<Box<dyn ModelProvider>, ModelError> {
        Ok(match settings.kind {
            ProviderKind::Anthropic => Box::new(AnthropicClient::from_settings(settings)?),
            ProviderKind::Ollama => Box::new(OllamaClient::from_settings(settings)?),
        })
    }
}
