// ABOUTME: MCP client for connecting to MCP servers via SSE or stdio.
// ABOUTME: Covers the lifecycle the agent uses: initialize, list tools, call tools.

use std::sync::Arc;

use super::transport::{SseTransport, StdioTransport, Transport};
use super::{
    McpInitializeResult, McpNotification, McpRequest, McpServerCapabilities, McpServerConfig,
    McpToolInfo, McpToolResult, McpTransportConfig,
};
use crate::error::McpError;

/// Client for communicating with an MCP server.
pub struct McpClient {
    config: McpServerConfig,
    transport: Arc<dyn Transport>,
    capabilities: McpServerCapabilities,
}

impl McpClient {
    /// Connect to an MCP server.
    pub async fn connect(config: McpServerConfig) -> Result<Self, McpError> {
        let transport: Arc<dyn Transport> = match &config.transport {
            McpTransportConfig::Stdio { command, args, env } => {
                Arc::new(StdioTransport::connect(command, args, env).await?)
            }
            McpTransportConfig::Sse { url } => Arc::new(SseTransport::connect(url).await?),
        };

        Ok(Self {
            config,
            transport,
            capabilities: McpServerCapabilities::default(),
        })
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Get the server capabilities (available after initialize).
    pub fn capabilities(&self) -> &McpServerCapabilities {
        &self.capabilities
    }

    /// Send a request and wait for its result.
    async fn request(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, McpError> {
        let request = McpRequest::new(method, params);
        let response = self.transport.send(request).await?;

        if let Some(error) = response.error {
            return Err(McpError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        response
            .result
            .ok_or_else(|| McpError::Protocol("No result in response".into()))
    }

    /// Send a notification (no response expected).
    async fn notify(&self, method: &str, params: Option<serde_json::Value>) -> Result<(), McpError> {
        let notification = McpNotification::new(method, params);
        self.transport.notify(notification).await
    }

    /// Initialize the MCP connection and record server capabilities.
    pub async fn initialize(&mut self) -> Result<McpInitializeResult, McpError> {
        let params = serde_json::json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {
                "name": "coral-agent",
                "version": env!("CARGO_PKG_VERSION")
            }
        });

        let result = self.request("initialize", Some(params)).await?;
        let init_result: McpInitializeResult = serde_json::from_value(result)?;

        self.capabilities = init_result.capabilities.clone();

        self.notify("notifications/initialized", None).await?;

        Ok(init_result)
    }

    /// List available tools from the server.
    pub async fn list_tools(&self) -> Result<Vec<McpToolInfo>, McpError> {
        let result = self.request("tools/list", None).await?;
        let tools: Vec<McpToolInfo> = serde_json::from_value(result["tools"].clone())?;
        Ok(tools)
    }

    /// Call a tool on the server.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<McpToolResult, McpError> {
        let params = serde_json::json!({
            "name": name,
            "arguments": arguments
        });

        let result = self.request("tools/call", Some(params)).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Ping the server to check if it's alive.
    pub async fn ping(&self) -> Result<(), McpError> {
        self.request("ping", None).await?;
        Ok(())
    }

    /// Shutdown the server connection gracefully.
    pub async fn shutdown(&self) -> Result<(), McpError> {
        self.transport.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_connect_nonexistent_stdio() {
        let config = McpServerConfig {
            name: "jfrog".into(),
            transport: McpTransportConfig::Stdio {
                command: "/nonexistent/binary".into(),
                args: vec![],
                env: HashMap::new(),
            },
        };

        let result = McpClient::connect(config).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_connect_unreachable_sse() {
        let config = McpServerConfig {
            name: "coral".into(),
            transport: McpTransportConfig::Sse {
                url: "http://127.0.0.1:1/sse".into(),
            },
        };

        let result = McpClient::connect(config).await;
        assert!(result.is_err());
    }
}
