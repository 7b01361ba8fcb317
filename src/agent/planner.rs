// ABOUTME: Planner - turns one instruction into a bounded sequence of tool
// ABOUTME: calls and exactly one reply on the originating thread.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{Mention, SEND_MESSAGE_TOOL};
use crate::config::ModelConfig;
use crate::error::{AgentError, LlmError};
use crate::llm::{ContentBlock, LlmClient, Message, Request, Role, Usage};
use crate::tool::{Registry, ToolOrigin};

const DEFAULT_MAX_ITERATIONS: usize = 12;

/// Result of handling one mention.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    /// Final natural-language answer.
    pub answer: String,

    /// Number of think-act iterations used.
    pub iterations: usize,

    /// Number of tool calls made during the plan.
    pub tool_calls: usize,

    /// Whether the reply reached the send tool.
    pub replied: bool,

    /// Total token usage across all LLM calls.
    pub usage: Usage,
}

/// Plans and executes tool calls for one instruction at a time.
pub struct Planner {
    client: Arc<dyn LlmClient>,
    registry: Registry,
    model: String,
    temperature: f64,
    max_tokens: u32,
    max_iterations: usize,
}

impl Planner {
    /// Create a planner over the validated tool registry.
    pub fn new(client: Arc<dyn LlmClient>, registry: Registry, model: &ModelConfig) -> Self {
        Self {
            client,
            registry,
            model: model.name.clone(),
            temperature: model.temperature,
            max_tokens: model.max_tokens,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Cap the think-act loop at `max` iterations.
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Handle one mention: plan, execute, and reply.
    ///
    /// A reply is mandatory on every instruction. If the model never calls
    /// the send tool itself, the planner sends the final answer; if the
    /// plan fails outright, the planner still sends an error description
    /// before surfacing the failure to the loop.
    pub async fn handle(&self, mention: &Mention) -> Result<PlanOutcome, AgentError> {
        let plan_id = Uuid::new_v4();
        info!(
            %plan_id,
            thread = %mention.thread_id,
            sender = %mention.sender_id,
            "handling instruction"
        );

        match self.think_act(mention).await {
            Ok(mut outcome) => {
                if !outcome.replied {
                    outcome.replied = self.send_reply(mention, &outcome.answer).await;
                }
                info!(
                    %plan_id,
                    iterations = outcome.iterations,
                    tool_calls = outcome.tool_calls,
                    replied = outcome.replied,
                    "instruction handled"
                );
                Ok(outcome)
            }
            Err(e) => {
                let answer = format!("The instruction could not be completed: {}", e);
                self.send_reply(mention, &answer).await;
                Err(e)
            }
        }
    }

    /// The bounded think-act loop. Tool calls execute strictly in order;
    /// each result feeds the next model turn.
    async fn think_act(&self, mention: &Mention) -> Result<PlanOutcome, AgentError> {
        let system = self.system_prompt().await;
        let tools = self.registry.to_definitions().await;
        let mut messages = vec![Message::user(format!(
            "New mention from agent '{}' in thread '{}':\n\n{}\n\n\
             Carry out the instruction, then reply to the sender in the same thread.",
            mention.sender_id, mention.thread_id, mention.content
        ))];

        let mut usage = Usage::default();
        let mut tool_calls = 0;
        let mut replied = false;
        let mut iterations = 0;

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(LlmError::Api {
                    status: 0,
                    message: format!(
                        "Planner exceeded max iterations ({})",
                        self.max_iterations
                    ),
                }
                .into());
            }

            let request = Request::new(&self.model)
                .system(&system)
                .messages(messages.clone())
                .tools(tools.clone())
                .max_tokens(self.max_tokens)
                .temperature(self.temperature);

            let response = self.client.create_message(&request).await?;
            usage.add(&response.usage);

            if !response.has_tool_use() {
                return Ok(PlanOutcome {
                    answer: response.text(),
                    iterations,
                    tool_calls,
                    replied,
                    usage,
                });
            }

            messages.push(Message {
                role: Role::Assistant,
                content: response.content.clone(),
            });

            let mut results = Vec::new();
            for block in &response.content {
                let ContentBlock::ToolUse { id, name, input } = block else {
                    continue;
                };
                tool_calls += 1;
                debug!(tool = %name, "executing planned tool call");

                let result = match self.registry.get(name).await {
                    Some(tool) => match tool.execute(input.clone()).await {
                        Ok(result) => {
                            if name == SEND_MESSAGE_TOOL && !result.is_error {
                                replied = true;
                            }
                            if result.is_error {
                                ContentBlock::tool_error(id, &result.content)
                            } else {
                                ContentBlock::tool_result(id, &result.content)
                            }
                        }
                        Err(e) => ContentBlock::tool_error(id, e.to_string()),
                    },
                    None => ContentBlock::tool_error(id, format!("Tool '{}' is not available", name)),
                };
                results.push(result);
            }

            messages.push(Message::tool_results(results));
        }
    }

    /// Send the reply directly through the Coral send tool.
    async fn send_reply(&self, mention: &Mention, content: &str) -> bool {
        let Some(tool) = self.registry.get(SEND_MESSAGE_TOOL).await else {
            warn!("send_message tool is not available; reply dropped");
            return false;
        };

        let params = serde_json::json!({
            "threadId": mention.thread_id,
            "content": content,
            "mentions": [mention.sender_id],
        });

        match tool.execute(params).await {
            Ok(result) if !result.is_error => true,
            Ok(result) => {
                warn!(error = %result.content, "reply delivery failed");
                false
            }
            Err(e) => {
                warn!(error = %e, "reply delivery failed");
                false
            }
        }
    }

    /// Render the system prompt with every tool schema inlined, grouped by
    /// origin so the model can honor the local-tool preference.
    async fn system_prompt(&self) -> String {
        let coral = self.describe_tools(ToolOrigin::Coral).await;
        let platform = self.describe_tools(ToolOrigin::Platform).await;
        let agent = self.describe_tools(ToolOrigin::Agent).await;

        format!(
            "You are a JFrog Artifactory agent on the Coral network. Other agents send you \
             instructions as mentions; your task is to perform any instruction related to \
             Artifactory management: building projects, uploading artifacts, scanning for \
             vulnerabilities, and repository queries.\n\n\
             Follow these steps for every instruction:\n\
             1. Read the mention content and identify the concrete Artifactory task.\n\
             2. Check the tool schemas below and make a step-by-step plan for the task.\n\
             3. Call only the tools the plan needs - never call a tool unnecessarily.\n\
             4. When one of your own agent tools and a remote tool could do the same job, \
             prefer the agent tool.\n\
             5. Use outputs of earlier steps (such as built artifact paths) as inputs to \
             later steps.\n\
             6. If an artifacts summary tool is available, call it only at the end of the plan.\n\
             7. Compose a final answer describing what was done, including any failures.\n\
             8. Send the answer with `send_message` to the sender in the same thread. Always \
             reply, even when you have only an error to report.\n\n\
             These are the Coral tools:\n{}\n\n\
             These are the JFrog platform tools:\n{}\n\n\
             These are your own agent tools:\n{}",
            coral, platform, agent
        )
    }

    async fn describe_tools(&self, origin: ToolOrigin) -> String {
        let tools = self.registry.by_origin(origin).await;
        if tools.is_empty() {
            return "(none)".to_string();
        }
        tools
            .iter()
            .map(|t| format!("Tool: {}, Schema: {}", t.name(), t.schema()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
