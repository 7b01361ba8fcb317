// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use coral_agent::prelude::*;` to get started quickly.

pub use crate::actions::{
    BuildAndUploadTool, BuildProjectTool, ScanProjectTool, UploadToJfrogTool, UploadTransport,
    action_tools,
};
pub use crate::agent::{
    Mention, MentionLoop, MentionLoopConfig, PlanOutcome, Planner, SEND_MESSAGE_TOOL,
    WAIT_FOR_MENTIONS_TOOL, parse_mentions,
};
pub use crate::config::{
    CoralConfig, JfrogConfig, ModelConfig, ModelProvider, Settings, UploadMode,
};
pub use crate::error::{
    AgentError, ConfigError, LlmError, McpError, ProcessError, ToolError,
};
pub use crate::llm::{
    AnthropicClient, ContentBlock, LlmClient, Message, OpenAIClient, Request, Response, Role,
    StopReason, ToolDefinition, Usage, build_client,
};
pub use crate::mcp::{
    McpClient, McpProxyTool, McpServerConfig, McpToolInfo, McpTransportConfig, SseTransport,
    StdioTransport, Transport, discover_tools,
};
pub use crate::process::{ProcessOutput, ProcessRunner, SystemRunner};
pub use crate::tool::{
    Registry, RejectReason, RejectedTool, Tool, ToolOrigin, ToolResult, ValidationReport,
    validate_tools,
};
