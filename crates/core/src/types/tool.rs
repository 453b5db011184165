use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::outcome::StagedProposal;

// =============================================================================
// Tool Types
// =============================================================================

/// Output from a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Whether the tool execution was successful.
    pub success: bool,

    /// Output content, or the error text when `success` is false.
    pub content: String,

    /// Optional structured data.
    pub data: Option<serde_json::Value>,

    /// Set when the tool staged a self-modification instead of acting.
    #[serde(default)]
    pub staged_proposal: Option<StagedProposal>,
}

impl ToolOutput {
    /// Create a successful text output.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: content.into(),
            data: None,
            staged_proposal: None,
        }
    }

    /// Attach structured data.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Create an output carrying a staged proposal.
    pub fn staged(summary: impl Into<String>, proposal: StagedProposal) -> Self {
        Self {
            success: true,
            content: summary.into(),
            data: None,
            staged_proposal: Some(proposal),
        }
    }

    /// Create a failed output.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            content: message.into(),
            data: None,
            staged_proposal: None,
        }
    }
}

/// Tool definition for the tool registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,

    /// Human-readable description.
    pub description: String,

    /// JSON Schema for tool arguments.
    pub parameters: serde_json::Value,
}

/// Read-only view of the registry taken once per request.
#[derive(Debug, Clone, Default)]
pub struct CapabilitySnapshot {
    tools: BTreeMap<String, ToolDefinition>,
}

impl CapabilitySnapshot {
    pub fn new(definitions: Vec<ToolDefinition>) -> Self {
        let tools = definitions
            .into_iter()
            .map(|d| (d.name.clone(), d))
            .collect();
        Self { tools }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// JSON object of `name -> {description, parameters}` for prompts.
    pub fn to_prompt_json(&self) -> String {
        let map: serde_json::Map<String, serde_json::Value> = self
            .tools
            .values()
            .map(|d| {
                (
                    d.name.clone(),
                    serde_json::json!({
                        "description": d.description,
                        "parameters": d.parameters,
                    }),
                )
            })
            .collect();
        serde_json::to_string_pretty(&map).unwrap_or_else(|_| "{}".to_string())
    }
}
