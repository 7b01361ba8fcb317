// ABOUTME: Tool schema validator - rejects tools whose parameter schema the
// ABOUTME: planner cannot safely render inline in its prompt.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{info, warn};

use super::Tool;

/// Why a candidate tool was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The schema contains `$ref` pointers to external definitions. The
    /// planner renders schemas as inline text, so an unresolved reference
    /// would reach the model as a dangling pointer with no meaning.
    UnresolvedRefs(Vec<String>),
    /// Obtaining or walking the schema panicked.
    SchemaError(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedRefs(refs) => write!(f, "unresolved references: {}", refs.join(", ")),
            Self::SchemaError(message) => write!(f, "schema error: {}", message),
        }
    }
}

/// A rejected candidate and the reason it was excluded.
#[derive(Debug, Clone)]
pub struct RejectedTool {
    pub name: String,
    pub reason: RejectReason,
}

/// Outcome of validating the candidate tool set.
pub struct ValidationReport {
    /// Accepted tools, in input order.
    pub valid: Vec<Arc<dyn Tool>>,
    /// Rejected tools with reasons, in input order.
    pub rejected: Vec<RejectedTool>,
}

/// Collect every `$ref` value reachable in a schema, at any nesting depth.
fn find_refs(value: &serde_json::Value, refs: &mut Vec<String>) {
    match value {
        serde_json::Value::Object(map) => {
            match map.get("$ref") {
                Some(serde_json::Value::String(target)) => refs.push(target.clone()),
                Some(other) => refs.push(other.to_string()),
                None => {}
            }
            for nested in map.values() {
                find_refs(nested, refs);
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                find_refs(item, refs);
            }
        }
        _ => {}
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Validate candidate tools and split them into accepted and rejected sets.
///
/// Tools with no declared schema (null or empty) are accepted. A tool whose
/// schema contains at least one `$ref` is rejected with the exact reference
/// strings; a tool whose schema access panics is rejected with the panic
/// text. Input order is preserved on both sides, and no error escapes.
///
/// Runs once per process start, after discovery, before the planner is built.
pub fn validate_tools(candidates: Vec<Arc<dyn Tool>>) -> ValidationReport {
    let total = candidates.len();
    let mut valid = Vec::new();
    let mut rejected = Vec::new();

    for tool in candidates {
        let name = tool.name().to_string();

        match panic::catch_unwind(AssertUnwindSafe(|| tool.schema())) {
            Ok(schema) => {
                let mut refs = Vec::new();
                find_refs(&schema, &mut refs);
                if refs.is_empty() {
                    valid.push(tool);
                } else {
                    rejected.push(RejectedTool {
                        name,
                        reason: RejectReason::UnresolvedRefs(refs),
                    });
                }
            }
            Err(payload) => {
                rejected.push(RejectedTool {
                    name,
                    reason: RejectReason::SchemaError(panic_message(payload)),
                });
            }
        }
    }

    if !rejected.is_empty() {
        warn!(count = rejected.len(), "found problematic tools");
        for tool in &rejected {
            warn!(tool = %tool.name, reason = %tool.reason, "excluding tool");
        }
    }
    info!(
        valid = valid.len(),
        total, "validated tool candidates for the planner"
    );

    ValidationReport { valid, rejected }
}
