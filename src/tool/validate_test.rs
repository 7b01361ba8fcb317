// ABOUTME: Tests for the schema validator - $ref detection at any depth,
// ABOUTME: panic capture, and preservation of candidate order.

use std::sync::Arc;

use super::*;

/// A candidate tool with a fixed schema.
struct SchemaTool {
    name: &'static str,
    schema: serde_json::Value,
}

impl SchemaTool {
    fn new(name: &'static str, schema: serde_json::Value) -> Arc<dyn Tool> {
        Arc::new(Self { name, schema })
    }
}

#[async_trait::async_trait]
impl Tool for SchemaTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "schema fixture"
    }

    fn schema(&self) -> serde_json::Value {
        self.schema.clone()
    }

    async fn execute(&self, _params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        Ok(ToolResult::text(""))
    }
}

/// A candidate whose schema access panics.
struct PanickingTool;

#[async_trait::async_trait]
impl Tool for PanickingTool {
    fn name(&self) -> &str {
        "broken"
    }

    fn description(&self) -> &str {
        "always panics"
    }

    fn schema(&self) -> serde_json::Value {
        panic!("schema generation exploded")
    }

    async fn execute(&self, _params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        Ok(ToolResult::text(""))
    }
}

#[test]
fn test_self_contained_schema_accepted() {
    let report = validate_tools(vec![SchemaTool::new(
        "build_project",
        serde_json::json!({
            "type": "object",
            "properties": {
                "project_path": {"type": "string"},
                "build_required": {"type": "boolean", "default": true}
            },
            "required": ["project_path"]
        }),
    )]);

    assert_eq!(report.valid.len(), 1);
    assert!(report.rejected.is_empty());
}

#[test]
fn test_top_level_ref_rejected() {
    let report = validate_tools(vec![SchemaTool::new(
        "query",
        serde_json::json!({"$ref": "#/definitions/Query"}),
    )]);

    assert!(report.valid.is_empty());
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].name, "query");
    assert_eq!(
        report.rejected[0].reason,
        RejectReason::UnresolvedRefs(vec!["#/definitions/Query".into()])
    );
}

#[test]
fn test_deeply_nested_ref_rejected() {
    let report = validate_tools(vec![SchemaTool::new(
        "execute_aql",
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "array",
                    "items": {
                        "anyOf": [
                            {"type": "string"},
                            {"$ref": "#/definitions/AqlClause"}
                        ]
                    }
                }
            }
        }),
    )]);

    assert_eq!(
        report.rejected[0].reason,
        RejectReason::UnresolvedRefs(vec!["#/definitions/AqlClause".into()])
    );
}

#[test]
fn test_multiple_refs_all_recorded() {
    let report = validate_tools(vec![SchemaTool::new(
        "create_repo",
        serde_json::json!({
            "properties": {
                "local": {"$ref": "#/definitions/LocalRepo"},
                "remote": {"$ref": "#/definitions/RemoteRepo"}
            }
        }),
    )]);

    match &report.rejected[0].reason {
        RejectReason::UnresolvedRefs(refs) => {
            assert_eq!(refs.len(), 2);
            assert!(refs.contains(&"#/definitions/LocalRepo".to_string()));
            assert!(refs.contains(&"#/definitions/RemoteRepo".to_string()));
        }
        other => panic!("unexpected reason: {:?}", other),
    }
}

#[test]
fn test_schemaless_tool_accepted() {
    let report = validate_tools(vec![SchemaTool::new("ping", serde_json::Value::Null)]);
    assert_eq!(report.valid.len(), 1);
}

#[test]
fn test_panicking_schema_rejected_with_message() {
    let report = validate_tools(vec![Arc::new(PanickingTool)]);

    assert!(report.valid.is_empty());
    assert_eq!(report.rejected[0].name, "broken");
    assert_eq!(
        report.rejected[0].reason,
        RejectReason::SchemaError("schema generation exploded".into())
    );
}

#[test]
fn test_mixed_candidates_preserve_order() {
    let report = validate_tools(vec![
        SchemaTool::new("wait_for_mentions", serde_json::json!({"type": "object"})),
        SchemaTool::new("bad_one", serde_json::json!({"$ref": "#/x"})),
        SchemaTool::new("send_message", serde_json::json!({"type": "object"})),
        SchemaTool::new("bad_two", serde_json::json!({"items": {"$ref": "#/y"}})),
        SchemaTool::new("build_project", serde_json::json!({"type": "object"})),
    ]);

    let valid_names: Vec<_> = report.valid.iter().map(|t| t.name().to_string()).collect();
    assert_eq!(
        valid_names,
        vec!["wait_for_mentions", "send_message", "build_project"]
    );

    let rejected_names: Vec<_> = report.rejected.iter().map(|t| t.name.clone()).collect();
    assert_eq!(rejected_names, vec!["bad_one", "bad_two"]);
}

#[test]
fn test_non_string_ref_value_recorded() {
    let report = validate_tools(vec![SchemaTool::new(
        "odd",
        serde_json::json!({"$ref": 7}),
    )]);

    assert_eq!(
        report.rejected[0].reason,
        RejectReason::UnresolvedRefs(vec!["7".into()])
    );
}
