// ABOUTME: Defines the LlmClient trait and provider selection.
// ABOUTME: The planner works against any provider through this abstraction.

use std::sync::Arc;

use async_trait::async_trait;

use super::{AnthropicClient, OpenAIClient, Request, Response};
use crate::config::{ModelConfig, ModelProvider};
use crate::error::LlmError;

/// Trait for LLM client implementations.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Create a message (non-streaming).
    async fn create_message(&self, req: &Request) -> Result<Response, LlmError>;
}

/// Build the client matching the configured provider.
pub fn build_client(config: &ModelConfig) -> Arc<dyn LlmClient> {
    match config.provider {
        ModelProvider::OpenAi => Arc::new(OpenAIClient::new(&config.api_key)),
        ModelProvider::Anthropic => Arc::new(AnthropicClient::new(&config.api_key)),
    }
}
