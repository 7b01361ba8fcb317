// ABOUTME: McpProxyTool wraps a remote MCP tool for use in the local registry.
// ABOUTME: Forwards calls to the server and tags the tool with its origin.

use std::sync::Arc;

use async_trait::async_trait;

use super::{McpClient, McpContentBlock, McpToolInfo};
use crate::error::McpError;
use crate::tool::{Tool, ToolOrigin, ToolResult};

/// A tool that proxies calls to an MCP server.
pub struct McpProxyTool {
    client: Arc<McpClient>,
    info: McpToolInfo,
    origin: ToolOrigin,
}

impl McpProxyTool {
    /// Create a new proxy tool.
    pub fn new(client: Arc<McpClient>, info: McpToolInfo, origin: ToolOrigin) -> Self {
        Self {
            client,
            info,
            origin,
        }
    }
}

#[async_trait]
impl Tool for McpProxyTool {
    fn name(&self) -> &str {
        &self.info.name
    }

    fn description(&self) -> &str {
        &self.info.description
    }

    fn schema(&self) -> serde_json::Value {
        self.info.input_schema.clone()
    }

    fn origin(&self) -> ToolOrigin {
        self.origin
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        let result = self.client.call_tool(&self.info.name, params).await?;

        // ToolResult is text-only; image content becomes a placeholder.
        let content = result
            .content
            .iter()
            .map(|c| match c {
                McpContentBlock::Text { text } => text.clone(),
                McpContentBlock::Image { mime_type, .. } => {
                    format!("[Image: {}]", mime_type)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        if result.is_error {
            Ok(ToolResult::error(content))
        } else {
            Ok(ToolResult::text(content))
        }
    }
}

/// Discover every tool a server offers and wrap each as a proxy.
///
/// The returned sequence preserves the server's listing order so the
/// validator sees candidates in discovery order.
pub async fn discover_tools(
    client: Arc<McpClient>,
    origin: ToolOrigin,
) -> Result<Vec<Arc<dyn Tool>>, McpError> {
    let infos = client.list_tools().await?;
    Ok(infos
        .into_iter()
        .map(|info| {
            Arc::new(McpProxyTool::new(client.clone(), info, origin)) as Arc<dyn Tool>
        })
        .collect())
}
