// ABOUTME: Implements the Registry - a thread-safe container for the tools
// ABOUTME: the planner may invoke, with local tools shadowing remote ones.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{Tool, ToolOrigin};
use crate::llm::ToolDefinition;

/// A thread-safe registry of tools.
#[derive(Default)]
pub struct Registry {
    tools: Arc<RwLock<HashMap<String, Arc<dyn Tool>>>>,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool.
    pub async fn register<T: Tool + 'static>(&self, tool: T) {
        self.register_arc(Arc::new(tool)).await;
    }

    /// Register a tool from an Arc.
    ///
    /// A locally-declared tool owns its name: a remote tool arriving under
    /// a name already held by an agent tool is dropped, and an agent tool
    /// replaces any remote tool of the same name.
    pub async fn register_arc(&self, tool: Arc<dyn Tool>) {
        let mut tools = self.tools.write().await;
        if let Some(existing) = tools.get(tool.name()) {
            if existing.origin() == ToolOrigin::Agent && tool.origin() != ToolOrigin::Agent {
                tracing::debug!(
                    tool = tool.name(),
                    origin = %tool.origin(),
                    "remote tool shadowed by local agent tool"
                );
                return;
            }
        }
        tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name.
    pub async fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().await;
        tools.get(name).cloned()
    }

    /// List all tool names, sorted alphabetically.
    pub async fn list(&self) -> Vec<String> {
        let tools = self.tools.read().await;
        let mut names: Vec<_> = tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get all registered tools.
    pub async fn all(&self) -> Vec<Arc<dyn Tool>> {
        let tools = self.tools.read().await;
        tools.values().cloned().collect()
    }

    /// Get all registered tools of one origin, sorted by name.
    pub async fn by_origin(&self, origin: ToolOrigin) -> Vec<Arc<dyn Tool>> {
        let tools = self.tools.read().await;
        let mut matched: Vec<_> = tools
            .values()
            .filter(|t| t.origin() == origin)
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.name().cmp(b.name()));
        matched
    }

    /// Get the number of registered tools.
    pub async fn count(&self) -> usize {
        let tools = self.tools.read().await;
        tools.len()
    }

    /// Convert all tools to LLM tool definitions.
    pub async fn to_definitions(&self) -> Vec<ToolDefinition> {
        let tools = self.tools.read().await;
        tools
            .values()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.schema(),
            })
            .collect()
    }
}

impl Clone for Registry {
    fn clone(&self) -> Self {
        Self {
            tools: Arc::clone(&self.tools),
        }
    }
}
