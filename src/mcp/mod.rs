// ABOUTME: MCP module - Model Context Protocol client implementation.
// ABOUTME: Connects to the Coral server (SSE) and the JFrog MCP server (stdio).

mod client;
mod proxy;
mod transport;
mod types;

pub use client::McpClient;
pub use proxy::{McpProxyTool, discover_tools};
pub use transport::{SseTransport, StdioTransport, Transport};
pub use types::*;

#[cfg(test)]
mod types_test;
