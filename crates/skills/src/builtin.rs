//! Built-in tools.
//!
//! Every tool receives the planner's wire form `{"args": [..], "kwargs": {..}}`
//! with string values and publishes its parameter shape through `schemars`.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use goal_agent_core::{
    traits::{TaskStatus, TaskTracker, Tool},
    types::{ProjectPlanStep, ProjectStepKind, ToolOutput},
    Error, Result,
};

/// Decoded step arguments.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepArgs {
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub kwargs: BTreeMap<String, String>,
}

impl StepArgs {
    pub fn parse(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value)
            .map_err(|e| Error::invalid_arguments(format!("expected {{args, kwargs}}: {}", e)))
    }

    /// First positional argument, else the named one.
    pub fn first_or(&self, key: &str) -> Option<&str> {
        self.args
            .first()
            .or_else(|| self.kwargs.get(key))
            .map(String::as_str)
    }
}

fn schema<T: JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or_default()
}

// =============================================================================
// Echo Tool
// =============================================================================

#[derive(JsonSchema)]
#[allow(dead_code)]
struct EchoParams {
    /// Words to echo back, joined with spaces.
    args: Vec<String>,
    kwargs: EchoKwargs,
}

#[derive(JsonSchema)]
#[allow(dead_code)]
struct EchoKwargs {
    /// Used when no positional words are given.
    message: Option<String>,
}

/// Simple echo tool for testing.
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echoes the input message back"
    }

    fn parameters(&self) -> Value {
        schema::<EchoParams>()
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput> {
        let args = StepArgs::parse(args)?;
        let message = if args.args.is_empty() {
            args.kwargs
                .get("message")
                .cloned()
                .unwrap_or_else(|| "No message provided".to_string())
        } else {
            args.args.join(" ")
        };

        Ok(ToolOutput::text(message))
    }
}

// =============================================================================
// Greet Tool
// =============================================================================

#[derive(JsonSchema)]
#[allow(dead_code)]
struct GreetParams {
    /// The first entry is the name of the person to greet.
    args: Vec<String>,
    kwargs: GreetKwargs,
}

#[derive(JsonSchema)]
#[allow(dead_code)]
struct GreetKwargs {
    name: Option<String>,
}

/// Greets a person by name.
pub struct GreetUserTool;

#[async_trait]
impl Tool for GreetUserTool {
    fn name(&self) -> &str {
        "greet_user"
    }

    fn description(&self) -> &str {
        "Greet a person by name"
    }

    fn parameters(&self) -> Value {
        schema::<GreetParams>()
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput> {
        let args = StepArgs::parse(args)?;
        let name = args
            .first_or("name")
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("there");

        Ok(ToolOutput::text(format!("Hello, {}! Nice to meet you.", name)))
    }
}

// =============================================================================
// Calculator Tool
// =============================================================================

#[derive(JsonSchema)]
#[allow(dead_code)]
struct CalculatorParams {
    /// Numbers to add together.
    args: Vec<String>,
}

/// Sums its numeric arguments.
pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Add a list of numbers"
    }

    fn parameters(&self) -> Value {
        schema::<CalculatorParams>()
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput> {
        let args = StepArgs::parse(args)?;
        if args.args.is_empty() {
            return Ok(ToolOutput::error("No numbers to add"));
        }

        let mut sum = 0.0;
        for raw in &args.args {
            match raw.trim().parse::<f64>() {
                Ok(n) => sum += n,
                Err(_) => return Ok(ToolOutput::error(format!("'{}' is not a number", raw))),
            }
        }

        Ok(ToolOutput::text(sum.to_string()).with_data(json!({ "result": sum })))
    }
}

// =============================================================================
// Clarification Tool
// =============================================================================

#[derive(JsonSchema)]
#[allow(dead_code)]
struct ClarificationParams {
    /// The first entry is the question to put to the user.
    args: Vec<String>,
    kwargs: ClarificationKwargs,
}

#[derive(JsonSchema)]
#[allow(dead_code)]
struct ClarificationKwargs {
    question: Option<String>,
}

/// Asks the user a question instead of acting.
pub struct RequestClarificationTool;

#[async_trait]
impl Tool for RequestClarificationTool {
    fn name(&self) -> &str {
        "request_user_clarification"
    }

    fn description(&self) -> &str {
        "Ask the user a clarifying question when the goal is ambiguous"
    }

    fn parameters(&self) -> Value {
        schema::<ClarificationParams>()
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput> {
        let args = StepArgs::parse(args)?;
        match args.first_or("question") {
            Some(question) => Ok(ToolOutput::text(question)),
            None => Ok(ToolOutput::error("No question provided")),
        }
    }
}

// =============================================================================
// Project Plan Tool
// =============================================================================

#[derive(JsonSchema)]
#[allow(dead_code)]
struct ProjectPlanParams {
    kwargs: ProjectPlanKwargs,
}

#[derive(JsonSchema)]
#[allow(dead_code)]
struct ProjectPlanKwargs {
    /// JSON array of elaborated project steps.
    project_plan: String,
    /// Tracker id of the project task.
    task_id: String,
}

/// Per-step status reported by [`ExecuteProjectPlanTool`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectStepStatus {
    pub step_id: String,
    #[serde(rename = "type")]
    pub step_type: String,
    pub status: String,
}

/// Walks a delegated project plan.
///
/// Scripts are queued, not run; review gates wait for the user. With a
/// tracker, the project task moves to `InProgress` while anything is queued
/// or awaiting review and to `Completed` otherwise.
#[derive(Default)]
pub struct ExecuteProjectPlanTool {
    tracker: Option<Arc<dyn TaskTracker>>,
}

impl ExecuteProjectPlanTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tracker(mut self, tracker: Arc<dyn TaskTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    async fn record_progress(&self, task_id: &str, open_steps: usize) -> Result<()> {
        let tracker = match (&self.tracker, task_id.is_empty()) {
            (Some(tracker), false) => tracker,
            _ => return Ok(()),
        };
        let status = if open_steps == 0 {
            TaskStatus::Completed
        } else {
            TaskStatus::InProgress
        };
        tracker
            .update_status(task_id, status)
            .await
            .map_err(|e| Error::tool_execution(format!("could not update task {}: {}", task_id, e)))
    }

    fn status_of(step: &ProjectPlanStep) -> String {
        match &step.kind {
            ProjectStepKind::Informational(d) => format!("delivered: {}", d.message),
            ProjectStepKind::HumanReviewGate(d) => format!("awaiting review: {}", d.prompt_to_user),
            ProjectStepKind::ScriptExecution(_) => "queued".to_string(),
        }
    }
}

#[async_trait]
impl Tool for ExecuteProjectPlanTool {
    fn name(&self) -> &str {
        "execute_project_plan"
    }

    fn description(&self) -> &str {
        "Run a multi-phase project plan produced by hierarchical planning"
    }

    fn parameters(&self) -> Value {
        schema::<ProjectPlanParams>()
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput> {
        let args = StepArgs::parse(args)?;

        let raw_plan = match args.kwargs.get("project_plan") {
            Some(plan) => plan,
            None => return Ok(ToolOutput::error("project_plan is required")),
        };
        let steps: Vec<ProjectPlanStep> = match serde_json::from_str(raw_plan) {
            Ok(steps) => steps,
            Err(e) => return Ok(ToolOutput::error(format!("project_plan is not a valid plan: {}", e))),
        };
        let task_id = args.kwargs.get("task_id").cloned().unwrap_or_default();

        let statuses: Vec<ProjectStepStatus> = steps
            .iter()
            .map(|step| ProjectStepStatus {
                step_id: step.step_id.clone(),
                step_type: step.type_name().to_string(),
                status: Self::status_of(step),
            })
            .collect();

        tracing::info!(task_id = %task_id, steps = statuses.len(), "Project plan accepted");

        let queued = statuses.iter().filter(|s| s.status == "queued").count();
        let open = statuses
            .iter()
            .filter(|s| !s.status.starts_with("delivered"))
            .count();
        self.record_progress(&task_id, open).await?;

        let mut content = format!(
            "Project task {} started with {} steps ({} queued).",
            task_id,
            statuses.len(),
            queued
        );
        for status in &statuses {
            content.push_str(&format!("\n{} [{}] {}", status.step_id, status.step_type, status.status));
        }

        Ok(ToolOutput::text(content).with_data(json!({
            "task_id": task_id,
            "steps": statuses,
        })))
    }
}
