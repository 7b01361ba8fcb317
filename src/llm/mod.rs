// ABOUTME: LLM module - client abstraction for language model providers.
// ABOUTME: Defines types, the LlmClient trait, and provider implementations.

mod anthropic;
mod client;
mod openai;
mod types;

pub use anthropic::*;
pub use client::*;
pub use openai::*;
pub use types::*;
