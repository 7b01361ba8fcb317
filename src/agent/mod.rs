// ABOUTME: Agent module - the planner and the outer mention loop.
// ABOUTME: Turns inbound Coral mentions into tool plans and mandatory replies.

mod mention;
mod mention_loop;
mod planner;

pub use mention::{Mention, parse_mentions};
pub use mention_loop::{MentionLoop, MentionLoopConfig};
pub use planner::{PlanOutcome, Planner};

/// Coral tool that blocks until another agent mentions this one.
pub const WAIT_FOR_MENTIONS_TOOL: &str = "wait_for_mentions";

/// Coral tool that posts a message into a thread.
pub const SEND_MESSAGE_TOOL: &str = "send_message";

/// How long one wait-for-mentions call may block, in milliseconds.
/// The bus owns this timeout; expiry just means "no mention this round".
pub const WAIT_TIMEOUT_MS: u64 = 30_000;

#[cfg(test)]
mod planner_test;
