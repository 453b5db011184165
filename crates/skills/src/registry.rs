//! Capability registry backed by a concurrent map.

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use serde_json::Value;
use std::sync::Arc;

use goal_agent_core::{
    traits::{TaskTracker, Tool, ToolRegistry},
    types::{ToolDefinition, ToolOutput},
    Error, Result,
};

use crate::builtin::{
    CalculatorTool, EchoTool, ExecuteProjectPlanTool, GreetUserTool, RequestClarificationTool,
};

/// Registry keyed by tool name. Tools are shared so a lookup never holds a
/// map guard while the tool runs.
#[derive(Default)]
pub struct DefaultToolRegistry {
    by_name: DashMap<String, Arc<dyn Tool>>,
}

impl DefaultToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    fn add_shared(&self, tool: Arc<dyn Tool>) -> Result<()> {
        match self.by_name.entry(tool.name().to_string()) {
            Entry::Occupied(slot) => Err(Error::internal(format!(
                "Tool '{}' is already registered",
                slot.key()
            ))),
            Entry::Vacant(slot) => {
                tracing::info!(tool = %slot.key(), "Tool registered");
                slot.insert(tool);
                Ok(())
            }
        }
    }

    fn lookup(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.by_name.get(name).map(|slot| Arc::clone(slot.value()))
    }
}

#[async_trait]
impl ToolRegistry for DefaultToolRegistry {
    async fn register(&self, tool: Box<dyn Tool>) -> Result<()> {
        self.add_shared(Arc::from(tool))
    }

    /// Sorted by name so planner prompts are stable between requests.
    async fn list(&self) -> Result<Vec<ToolDefinition>> {
        let mut catalog = Vec::with_capacity(self.by_name.len());
        for slot in self.by_name.iter() {
            let tool = slot.value();
            catalog.push(ToolDefinition {
                name: slot.key().clone(),
                description: tool.description().to_string(),
                parameters: tool.parameters(),
            });
        }
        catalog.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(catalog)
    }

    async fn execute(&self, name: &str, args: Value) -> Result<ToolOutput> {
        let tool = self.lookup(name).ok_or_else(|| Error::tool_not_found(name))?;
        tracing::debug!(tool = %name, "Invoking tool");
        tool.execute(args).await
    }
}

/// Registry preloaded with every builtin capability.
pub fn create_default_registry() -> Result<DefaultToolRegistry> {
    builtin_registry(ExecuteProjectPlanTool::new())
}

/// Builtins, with `execute_project_plan` reporting progress to `tracker`.
pub fn create_tracked_registry(tracker: Arc<dyn TaskTracker>) -> Result<DefaultToolRegistry> {
    builtin_registry(ExecuteProjectPlanTool::new().with_tracker(tracker))
}

fn builtin_registry(project_tool: ExecuteProjectPlanTool) -> Result<DefaultToolRegistry> {
    let registry = DefaultToolRegistry::new();
    let builtins: [Arc<dyn Tool>; 5] = [
        Arc::new(EchoTool),
        Arc::new(GreetUserTool),
        Arc::new(CalculatorTool),
        Arc::new(RequestClarificationTool),
        Arc::new(project_tool),
    ];
    for tool in builtins {
        registry.add_shared(tool)?;
    }
    Ok(registry)
}
