//! Tool registry: the fixed table of actions the model may call.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, ToolError};
use crate::store::TodoStore;
use crate::tools::builtin::{CreateTodoTool, DeleteByIdTool, GetAllTodosTool, SearchTodoTool};
use crate::tools::tool::Tool;

/// Registry of available tools, keyed by the name the model uses.
///
/// Built once at startup and read-only afterwards.
pub struct ToolRegistry {
    tools: HashMap<&'static str, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// The four todo tools bound to `store`.
    pub fn with_todo_tools(store: Arc<dyn TodoStore>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(GetAllTodosTool::new(Arc::clone(&store))));
        registry.register(Arc::new(CreateTodoTool::new(Arc::clone(&store))));
        registry.register(Arc::new(DeleteByIdTool::new(Arc::clone(&store))));
        registry.register(Arc::new(SearchTodoTool::new(store)));
        registry
    }

    /// Register a tool. A second tool with the same name is rejected.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name();
        if self.tools.contains_key(name) {
            warn!(tool = name, "Rejected duplicate tool registration");
            return;
        }
        self.tools.insert(name, tool);
        debug!("Registered tool: {}", name);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// All tool names, sorted.
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.tools.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Get the number of registered tools.
    pub fn count(&self) -> usize {
        self.tools.len()
    }

    /// Run the named tool with `input`.
    ///
    /// Unknown names fail with `ToolError::NotFound`, which carries the
    /// input that came with the request.
    pub async fn dispatch(&self, name: &str, input: Option<&str>) -> Result<Value, Error> {
        let Some(tool) = self.get(name) else {
            warn!(tool = name, ?input, "Model requested an unknown tool");
            return Err(ToolError::NotFound {
                name: name.to_string(),
                input: input.map(str::to_string),
            }
            .into());
        };

        debug!(tool = name, ?input, "Dispatching tool");
        tool.execute(input).await.map_err(|e| {
            warn!(tool = name, error = %e, "Tool failed");
            ToolError::ExecutionFailed {
                name: name.to_string(),
                source: Box::new(e),
            }
            .into()
        })
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LibSqlBackend;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct MockTool {
        name: &'static str,
    }

    #[async_trait]
    impl Tool for MockTool {
        fn name(&self) -> &'static str {
            self.name
        }
        fn description(&self) -> &str {
            "A mock tool for testing"
        }
        async fn execute(&self, input: Option<&str>) -> Result<Value, Error> {
            Ok(Value::from(input.unwrap_or("mock")))
        }
    }

    async fn todo_registry() -> ToolRegistry {
        let store: Arc<dyn TodoStore> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        ToolRegistry::with_todo_tools(store)
    }

    #[tokio::test]
    async fn todo_tools_are_registered_once() {
        let registry = todo_registry().await;
        assert_eq!(registry.count(), 4);
        assert_eq!(
            registry.list(),
            vec!["createTodo", "deleteById", "getAllTodos", "searchTodo"]
        );
    }

    #[tokio::test]
    async fn every_listed_tool_is_described() {
        let registry = todo_registry().await;
        for name in registry.list() {
            let tool = registry.get(name).unwrap();
            assert_eq!(tool.name(), name);
            assert!(!tool.description().is_empty());
        }
    }

    #[test]
    fn duplicate_registration_keeps_first() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(MockTool { name: "echo" }));
        registry.register(Arc::new(MockTool { name: "echo" }));
        assert_eq!(registry.count(), 1);
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[tokio::test]
    async fn dispatch_runs_named_tool() {
        let registry = todo_registry().await;
        let id = registry
            .dispatch("createTodo", Some("buy milk"))
            .await
            .unwrap();
        assert!(id.is_i64());

        let all = registry.dispatch("getAllTodos", None).await.unwrap();
        assert_eq!(all.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn dispatch_unknown_tool_surfaces_input() {
        let registry = todo_registry().await;
        let err = registry
            .dispatch("updateTodo", Some("rename milk"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "UnknownToolError");
        match err {
            Error::Tool(ToolError::NotFound { name, input }) => {
                assert_eq!(name, "updateTodo");
                assert_eq!(input.as_deref(), Some("rename milk"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn dispatch_wraps_tool_failure() {
        let registry = todo_registry().await;
        let err = registry.dispatch("createTodo", Some("  ")).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Tool(ToolError::ExecutionFailed { ref name, .. }) if name == "createTodo"
        ));
        assert_eq!(err.kind(), "ValidationError");
    }
}
