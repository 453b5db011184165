use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Flat Plan Types
// =============================================================================

/// One planned capability invocation.
///
/// Every argument is held as a string; coercion happens when a raw record is
/// accepted by the plan validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Capability name, validated against a registry snapshot.
    pub tool_name: String,

    /// Positional arguments.
    #[serde(default)]
    pub args: Vec<String>,

    /// Keyword arguments.
    #[serde(default)]
    pub kwargs: BTreeMap<String, String>,

    /// Display-only description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Display-only reasoning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl Step {
    /// Create a step with no arguments.
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            args: Vec::new(),
            kwargs: BTreeMap::new(),
            description: None,
            reasoning: None,
        }
    }

    /// Append a positional argument.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set a keyword argument.
    pub fn with_kwarg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    /// Set the display description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// An ordered, validated sequence of steps.
///
/// An empty plan means "no action determined". Once built a plan is only
/// read; wrapping it for delegation produces a new plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plan {
    steps: Vec<Step>,
}

impl Plan {
    /// Build a plan from validated steps.
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// The "no action determined" plan.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Steps in execution order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    /// Names of the capabilities this plan invokes, in order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.tool_name.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

impl From<Vec<Step>> for Plan {
    fn from(steps: Vec<Step>) -> Self {
        Self::new(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_builder() {
        let step = Step::new("greet_user")
            .with_arg("John")
            .with_kwarg("tone", "warm");

        assert_eq!(step.tool_name, "greet_user");
        assert_eq!(step.args, vec!["John".to_string()]);
        assert_eq!(step.kwargs.get("tone").map(String::as_str), Some("warm"));
        assert!(step.description.is_none());
    }

    #[test]
    fn test_plan_serializes_as_list() {
        let plan = Plan::new(vec![Step::new("echo").with_arg("hi")]);
        let json = serde_json::to_value(&plan).unwrap();

        assert!(json.is_array());
        assert_eq!(json[0]["tool_name"], "echo");
        assert!(json[0].get("description").is_none());
    }

    #[test]
    fn test_empty_plan() {
        let plan = Plan::empty();
        assert!(plan.is_empty());
        assert!(plan.tool_names().is_empty());
    }
}
