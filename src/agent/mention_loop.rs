// ABOUTME: MentionLoop - the outer two-state loop: wait for a mention, hand it
// ABOUTME: to the planner, reply, back off on error, repeat until cancelled.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::{Mention, PlanOutcome, Planner, WAIT_FOR_MENTIONS_TOOL, WAIT_TIMEOUT_MS, parse_mentions};
use crate::error::{AgentError, ToolError};
use crate::tool::Registry;

/// Delays applied between loop iterations.
#[derive(Debug, Clone)]
pub struct MentionLoopConfig {
    /// How long one wait call may block, in milliseconds.
    pub wait_timeout_ms: u64,
    /// Pause after a successfully handled mention.
    pub success_delay: Duration,
    /// Longer pause after a failed iteration.
    pub error_delay: Duration,
}

impl Default for MentionLoopConfig {
    fn default() -> Self {
        Self {
            wait_timeout_ms: WAIT_TIMEOUT_MS,
            success_delay: Duration::from_secs(1),
            error_delay: Duration::from_secs(5),
        }
    }
}

/// The agent's outer control loop.
///
/// There is no terminal state: every iteration's error is logged and
/// swallowed, and only the cancellation token ends the loop.
pub struct MentionLoop {
    planner: Planner,
    registry: Registry,
    config: MentionLoopConfig,
}

impl MentionLoop {
    pub fn new(planner: Planner, registry: Registry) -> Self {
        Self {
            planner,
            registry,
            config: MentionLoopConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MentionLoopConfig) -> Self {
        self.config = config;
        self
    }

    /// Run until the token is cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        info!("mention loop started");

        loop {
            if cancel.is_cancelled() {
                break;
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                outcome = self.step() => match outcome {
                    Ok(Some(outcome)) => {
                        info!(
                            tool_calls = outcome.tool_calls,
                            replied = outcome.replied,
                            "mention handled, restarting loop"
                        );
                        self.pause(&cancel, self.config.success_delay).await;
                    }
                    // The wait expired with no mention; go straight back to waiting.
                    Ok(None) => {}
                    Err(e) => {
                        error!(error = %e, "error in mention loop iteration");
                        self.pause(&cancel, self.config.error_delay).await;
                    }
                },
            }
        }

        info!("mention loop stopped");
    }

    /// One Idle -> Handling -> Idle transition.
    async fn step(&self) -> Result<Option<PlanOutcome>, AgentError> {
        let Some(mention) = self.next_mention().await? else {
            return Ok(None);
        };
        let outcome = self.planner.handle(&mention).await?;
        Ok(Some(outcome))
    }

    /// Invoke the Coral wait tool and parse its payload.
    async fn next_mention(&self) -> Result<Option<Mention>, AgentError> {
        let tool = self
            .registry
            .get(WAIT_FOR_MENTIONS_TOOL)
            .await
            .ok_or_else(|| ToolError::NotFound(WAIT_FOR_MENTIONS_TOOL.to_string()))?;

        let result = tool
            .execute(serde_json::json!({ "timeoutMs": self.config.wait_timeout_ms }))
            .await
            .map_err(ToolError::Execution)?;

        if result.is_error {
            return Err(ToolError::Execution(anyhow::anyhow!("{}", result.content)).into());
        }

        Ok(parse_mentions(&result.content).into_iter().next())
    }

    async fn pause(&self, cancel: &CancellationToken, delay: Duration) {
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
