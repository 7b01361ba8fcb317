// ABOUTME: Defines the Tool trait - the core abstraction for agent capabilities.
// ABOUTME: Tools have a name, description, schema, origin, and async execute method.

use std::fmt;

use async_trait::async_trait;

use super::ToolResult;

/// Where a tool was discovered or declared.
///
/// Tools from all three sources are normalized to the same `Tool` shape;
/// the origin tag is what lets the planner prefer locally-defined tools
/// when a remote tool could satisfy the same need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOrigin {
    /// Discovered from the Coral message bus.
    Coral,
    /// Discovered from the JFrog MCP server.
    Platform,
    /// Declared locally by this agent.
    Agent,
}

impl fmt::Display for ToolOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coral => write!(f, "coral"),
            Self::Platform => write!(f, "platform"),
            Self::Agent => write!(f, "agent"),
        }
    }
}

/// A tool that can be executed by the planner.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the unique name of this tool.
    fn name(&self) -> &str;

    /// Returns a human-readable description for the LLM.
    fn description(&self) -> &str;

    /// Returns the JSON Schema for the tool's input parameters.
    fn schema(&self) -> serde_json::Value;

    /// Returns where this tool came from.
    fn origin(&self) -> ToolOrigin {
        ToolOrigin::Agent
    }

    /// Execute the tool with the given parameters.
    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error>;
}
