//! Capability traits.

use async_trait::async_trait;
use serde_json::Value;
use crate::error::Result;
use crate::types::{ToolDefinition, ToolOutput};

/// Tool interface for a single named capability.
///
/// `args` arrives as `{"args": [..], "kwargs": {..}}` with string values.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the planner refers to in `tool_name`.
    fn name(&self) -> &str;

    /// One-line summary shown to the planner.
    fn description(&self) -> &str;

    /// JSON Schema describing `args` and `kwargs`.
    fn parameters(&self) -> Value;

    async fn execute(&self, args: Value) -> Result<ToolOutput>;
}

/// Live set of capabilities, snapshotted once per request.
#[async_trait]
pub trait ToolRegistry: Send + Sync {
    /// Add a tool; names are unique.
    async fn register(&self, tool: Box<dyn Tool>) -> Result<()>;

    async fn list(&self) -> Result<Vec<ToolDefinition>>;

    /// Run `name`; unknown names are `Error::ToolNotFound`.
    async fn execute(&self, name: &str, args: Value) -> Result<ToolOutput>;
}
