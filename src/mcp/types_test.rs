// ABOUTME: Tests for MCP protocol types - JSON-RPC framing and tool info parsing.
// ABOUTME: Exercises serialization shapes the Coral and JFrog servers rely on.

use super::*;

#[test]
fn test_request_ids_increment() {
    let first = McpRequest::new("tools/list", None);
    let second = McpRequest::new("tools/list", None);
    assert!(second.id > first.id);
    assert_eq!(first.jsonrpc, "2.0");
}

#[test]
fn test_request_skips_absent_params() {
    let request = McpRequest::new("ping", None);
    let json = serde_json::to_value(&request).unwrap();
    assert!(json.get("params").is_none());
}

#[test]
fn test_response_with_error() {
    let raw = r#"{"jsonrpc":"2.0","id":7,"error":{"code":-32601,"message":"Method not found"}}"#;
    let response: McpResponse = serde_json::from_str(raw).unwrap();

    assert_eq!(response.id, 7);
    assert!(response.result.is_none());
    let error = response.error.unwrap();
    assert_eq!(error.code, -32601);
    assert_eq!(error.message, "Method not found");
}

#[test]
fn test_tool_info_parses_input_schema() {
    let raw = serde_json::json!({
        "name": "wait_for_mentions",
        "description": "Wait for mentions addressed to this agent",
        "inputSchema": {
            "type": "object",
            "properties": {"timeoutMs": {"type": "number"}}
        }
    });

    let info: McpToolInfo = serde_json::from_value(raw).unwrap();
    assert_eq!(info.name, "wait_for_mentions");
    assert_eq!(info.input_schema["type"], "object");
}

#[test]
fn test_tool_info_defaults_missing_description() {
    let raw = serde_json::json!({
        "name": "send_message",
        "inputSchema": {"type": "object"}
    });

    let info: McpToolInfo = serde_json::from_value(raw).unwrap();
    assert_eq!(info.description, "");
}

#[test]
fn test_tool_result_error_flag() {
    let raw = serde_json::json!({
        "content": [{"type": "text", "text": "repository not found"}],
        "isError": true
    });

    let result: McpToolResult = serde_json::from_value(raw).unwrap();
    assert!(result.is_error);
    assert!(matches!(
        &result.content[0],
        McpContentBlock::Text { text } if text == "repository not found"
    ));
}
