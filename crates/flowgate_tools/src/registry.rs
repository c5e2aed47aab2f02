//! Tool registry trait and an in-memory implementation.

use async_trait::async_trait;
use flowgate_error::{ToolError, ToolErrorKind};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Lookup and execution service for named tools.
#[async_trait]
pub trait ToolRegistry: Send + Sync {
    /// Whether a tool with this name is registered.
    fn has(&self, name: &str) -> bool;

    /// Run the named tool.
    async fn execute(&self, name: &str, arguments: Value) -> Result<Value, ToolError>;
}

/// A named operation that can be registered with [`InMemoryToolRegistry`].
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool name.
    fn name(&self) -> &str;

    /// Returns a human-readable description.
    fn description(&self) -> &str;

    /// Executes the tool with the given arguments.
    async fn execute(&self, arguments: Value) -> Result<Value, ToolError>;
}

/// Registry holding tools in a map keyed by name.
#[derive(Clone, Default)]
pub struct InMemoryToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl InMemoryToolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool, replacing any tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            info!(tool = %name, "Replaced registered tool");
        } else {
            debug!(tool = %name, "Registered tool");
        }
    }

    /// Gets a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[async_trait]
impl ToolRegistry for InMemoryToolRegistry {
    fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    async fn execute(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::new(ToolErrorKind::NotFound(name.to_string())))?;

        tool.execute(arguments).await
    }
}
