// ABOUTME: Tests for the Planner - tool sequencing, the mandatory-reply
// ABOUTME: invariant, and failure paths that must still answer the sender.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::*;
use crate::agent::SEND_MESSAGE_TOOL;
use crate::config::{ModelConfig, ModelProvider};
use crate::error::{AgentError, LlmError};
use crate::llm::{ContentBlock, LlmClient, Request, Response, StopReason, Usage};
use crate::tool::{Registry, Tool, ToolOrigin, ToolResult};

/// Replays scripted responses and records every request it saw.
struct ScriptedLlm {
    responses: Mutex<VecDeque<Result<Response, LlmError>>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedLlm {
    fn new(responses: Vec<Result<Response, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn create_message(&self, req: &Request) -> Result<Response, LlmError> {
        self.requests.lock().unwrap().push(req.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted LLM call")
    }
}

fn text_response(text: &str) -> Result<Response, LlmError> {
    Ok(Response {
        id: "r".into(),
        content: vec![ContentBlock::text(text)],
        stop_reason: StopReason::EndTurn,
        model: "gpt-4.1".into(),
        usage: Usage {
            input_tokens: 10,
            output_tokens: 5,
        },
    })
}

fn tool_use_response(calls: &[(&str, &str, serde_json::Value)]) -> Result<Response, LlmError> {
    Ok(Response {
        id: "r".into(),
        content: calls
            .iter()
            .map(|(id, name, input)| ContentBlock::ToolUse {
                id: id.to_string(),
                name: name.to_string(),
                input: input.clone(),
            })
            .collect(),
        stop_reason: StopReason::ToolUse,
        model: "gpt-4.1".into(),
        usage: Usage {
            input_tokens: 10,
            output_tokens: 5,
        },
    })
}

/// Records invocations and returns a fixed result.
struct RecordingTool {
    name: &'static str,
    origin: ToolOrigin,
    result: ToolResult,
    invocations: Mutex<Vec<serde_json::Value>>,
}

impl RecordingTool {
    fn new(name: &'static str, origin: ToolOrigin, result: ToolResult) -> Arc<Self> {
        Arc::new(Self {
            name,
            origin,
            result,
            invocations: Mutex::new(Vec::new()),
        })
    }

    fn invocations(&self) -> Vec<serde_json::Value> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl Tool for RecordingTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "recording tool"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object"})
    }

    fn origin(&self) -> ToolOrigin {
        self.origin
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        self.invocations.lock().unwrap().push(params);
        Ok(self.result.clone())
    }
}

fn model_config() -> ModelConfig {
    ModelConfig {
        name: "gpt-4.1".into(),
        provider: ModelProvider::OpenAi,
        api_key: "sk-test".into(),
        temperature: 0.3,
        max_tokens: 4000,
    }
}

fn mention() -> Mention {
    Mention {
        thread_id: "t-1".into(),
        sender_id: "interface_agent".into(),
        content: "build and upload /tmp/demo to pypi-local".into(),
    }
}

async fn registry_with_send() -> (Registry, Arc<RecordingTool>) {
    let registry = Registry::new();
    let send = RecordingTool::new(
        SEND_MESSAGE_TOOL,
        ToolOrigin::Coral,
        ToolResult::text("sent"),
    );
    registry.register_arc(send.clone()).await;
    (registry, send)
}

#[tokio::test]
async fn test_plain_answer_still_replies() {
    let (registry, send) = registry_with_send().await;
    let llm = ScriptedLlm::new(vec![text_response("Nothing to do.")]);
    let planner = Planner::new(llm.clone(), registry, &model_config());

    let outcome = planner.handle(&mention()).await.unwrap();

    assert_eq!(outcome.answer, "Nothing to do.");
    assert!(outcome.replied);
    // the planner's own reply is not a planned tool call
    assert_eq!(outcome.tool_calls, 0);

    let sent = send.invocations();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["threadId"], "t-1");
    assert_eq!(sent[0]["mentions"][0], "interface_agent");
    assert_eq!(sent[0]["content"], "Nothing to do.");
}

#[tokio::test]
async fn test_tool_plan_executes_in_order_and_feeds_results_back() {
    let (registry, _send) = registry_with_send().await;
    let build = RecordingTool::new(
        "build_project",
        ToolOrigin::Agent,
        ToolResult::text("Project built successfully"),
    );
    registry.register_arc(build.clone()).await;

    let llm = ScriptedLlm::new(vec![
        tool_use_response(&[(
            "call_1",
            "build_project",
            serde_json::json!({"project_path": "/tmp/demo"}),
        )]),
        text_response("Built."),
    ]);
    let planner = Planner::new(llm.clone(), registry, &model_config());

    let outcome = planner.handle(&mention()).await.unwrap();

    assert_eq!(outcome.iterations, 2);
    assert_eq!(build.invocations().len(), 1);
    assert_eq!(build.invocations()[0]["project_path"], "/tmp/demo");

    // The second model turn saw the tool result from the first.
    let requests = llm.requests();
    assert_eq!(requests.len(), 2);
    let followup = &requests[1].messages;
    let last = followup.last().unwrap();
    assert!(matches!(
        &last.content[0],
        ContentBlock::ToolResult { tool_use_id, content, is_error }
            if tool_use_id == "call_1" && content.contains("built successfully") && !is_error
    ));
}

#[tokio::test]
async fn test_model_reply_suppresses_planner_reply() {
    let (registry, send) = registry_with_send().await;

    let llm = ScriptedLlm::new(vec![
        tool_use_response(&[(
            "call_1",
            SEND_MESSAGE_TOOL,
            serde_json::json!({
                "threadId": "t-1",
                "content": "All done.",
                "mentions": ["interface_agent"],
            }),
        )]),
        text_response("All done."),
    ]);
    let planner = Planner::new(llm, registry, &model_config());

    let outcome = planner.handle(&mention()).await.unwrap();

    assert!(outcome.replied);
    // Exactly one reply went out - the model's own.
    assert_eq!(send.invocations().len(), 1);
    assert_eq!(send.invocations()[0]["content"], "All done.");
}

#[tokio::test]
async fn test_unknown_tool_becomes_error_result_for_model() {
    let (registry, _send) = registry_with_send().await;

    let llm = ScriptedLlm::new(vec![
        tool_use_response(&[(
            "call_1",
            "invented_tool",
            serde_json::json!({}),
        )]),
        text_response("Could not use that tool."),
    ]);
    let planner = Planner::new(llm.clone(), registry, &model_config());

    let outcome = planner.handle(&mention()).await.unwrap();
    assert!(outcome.replied);

    let requests = llm.requests();
    let last = requests[1].messages.last().unwrap();
    assert!(matches!(
        &last.content[0],
        ContentBlock::ToolResult { content, is_error, .. }
            if *is_error && content.contains("invented_tool")
    ));
}

#[tokio::test]
async fn test_llm_failure_still_sends_error_reply() {
    let (registry, send) = registry_with_send().await;
    let llm = ScriptedLlm::new(vec![Err(LlmError::Api {
        status: 500,
        message: "backend unavailable".into(),
    })]);
    let planner = Planner::new(llm, registry, &model_config());

    let result = planner.handle(&mention()).await;
    assert!(matches!(result, Err(AgentError::Llm(_))));

    let sent = send.invocations();
    assert_eq!(sent.len(), 1);
    let content = sent[0]["content"].as_str().unwrap();
    assert!(content.contains("could not be completed"));
    assert!(content.contains("backend unavailable"));
}

#[tokio::test]
async fn test_iteration_cap_surfaces_as_error_with_reply() {
    let (registry, send) = registry_with_send().await;
    let noop = RecordingTool::new("spin", ToolOrigin::Agent, ToolResult::text("ok"));
    registry.register_arc(noop).await;

    // The model asks for the same tool forever.
    let spin = || tool_use_response(&[("call", "spin", serde_json::json!({}))]);
    let llm = ScriptedLlm::new(vec![spin(), spin(), spin(), spin()]);
    let planner = Planner::new(llm, registry, &model_config()).max_iterations(3);

    let result = planner.handle(&mention()).await;
    assert!(result.is_err());
    assert_eq!(send.invocations().len(), 1);
    assert!(
        send.invocations()[0]["content"]
            .as_str()
            .unwrap()
            .contains("max iterations")
    );
}

#[tokio::test]
async fn test_system_prompt_groups_tools_by_origin() {
    let (registry, _send) = registry_with_send().await;
    registry
        .register_arc(RecordingTool::new(
            "build_project",
            ToolOrigin::Agent,
            ToolResult::text("ok"),
        ))
        .await;
    registry
        .register_arc(RecordingTool::new(
            "get_artifacts_summary",
            ToolOrigin::Platform,
            ToolResult::text("ok"),
        ))
        .await;

    let llm = ScriptedLlm::new(vec![text_response("done")]);
    let planner = Planner::new(llm.clone(), registry, &model_config());
    planner.handle(&mention()).await.unwrap();

    let system = llm.requests()[0].system.clone().unwrap();
    let coral_at = system.find("These are the Coral tools:").unwrap();
    let platform_at = system.find("These are the JFrog platform tools:").unwrap();
    let agent_at = system.find("These are your own agent tools:").unwrap();

    assert!(coral_at < platform_at && platform_at < agent_at);
    assert!(system[coral_at..platform_at].contains(SEND_MESSAGE_TOOL));
    assert!(system[platform_at..agent_at].contains("get_artifacts_summary"));
    assert!(system[agent_at..].contains("build_project"));
}
