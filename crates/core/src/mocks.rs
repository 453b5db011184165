//! Mock implementations of core traits for testing.
//!
//! Every mock records what it was asked so tests can assert call counts and
//! arguments without a real backend.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};

use crate::{
    traits::{
        ChatMessage, ExecutionCoordinator, FactStore, LlmClient, LlmResponse,
        ProjectDecomposer, SelfModifier, TaskStatus, TaskTracker, TaskType, Tool, ToolRegistry,
    },
    types::{
        ExecutionReport, Fact, Plan, ProjectPlanStep, StagedProposal, StepResult,
        ToolDefinition, ToolOutput,
    },
    Error, Result,
};

// =============================================================================
// Mock LLM Client
// =============================================================================

/// Scripted mock LLM that returns predefined responses in order.
///
/// Once the script runs out every further call returns an empty response.
/// A scripted `None` simulates a transport error for that call.
pub struct MockLlm {
    responses: Mutex<Vec<Option<String>>>,
    call_count: Mutex<usize>,
    prompts: Mutex<Vec<String>>,
    repeat_last: bool,
}

impl MockLlm {
    /// Create a new mock LLM with a queue of responses.
    pub fn new(responses: Vec<&str>) -> Self {
        Self::scripted(responses.into_iter().map(|r| Some(r.to_string())).collect())
    }

    /// Create a mock whose `None` entries fail with a provider error.
    pub fn scripted(responses: Vec<Option<String>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            call_count: Mutex::new(0),
            prompts: Mutex::new(Vec::new()),
            repeat_last: false,
        }
    }

    /// Create a mock that always returns the same response.
    pub fn constant(response: &str) -> Self {
        let mut mock = Self::new(vec![response]);
        mock.repeat_last = true;
        mock
    }

    /// Create a mock that always fails.
    pub fn failing() -> Self {
        let mut mock = Self::scripted(vec![None]);
        mock.repeat_last = true;
        mock
    }

    /// Get the number of calls made to this mock.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Every prompt received, in order. Chat calls are flattened to one line per message.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn next(&self, prompt: String) -> Result<LlmResponse> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;
        self.prompts.lock().unwrap().push(prompt);

        let responses = self.responses.lock().unwrap();
        let idx = *count - 1;
        let scripted = match responses.get(idx) {
            Some(entry) => Some(entry.clone()),
            None if self.repeat_last => responses.last().cloned(),
            None => None,
        };

        match scripted {
            Some(Some(content)) => Ok(LlmResponse::text(content)),
            Some(None) => Err(Error::model_provider("scripted transport failure")),
            None => Ok(LlmResponse::text("")),
        }
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn complete(&self, prompt: &str) -> Result<LlmResponse> {
        self.next(prompt.to_string())
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<LlmResponse> {
        let flattened = messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n");
        self.next(flattened)
    }
}

// =============================================================================
// Mock Tool Registry
// =============================================================================

/// A tool that records its invocations and returns a fixed output.
pub struct RecordingTool {
    name: String,
    description: String,
    output: ToolOutput,
    calls: Arc<Mutex<Vec<Value>>>,
}

impl RecordingTool {
    pub fn new(name: &str, output: ToolOutput) -> Self {
        Self {
            name: name.to_string(),
            description: format!("Mock tool {}", name),
            output,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the recorded calls.
    pub fn calls(&self) -> Arc<Mutex<Vec<Value>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl Tool for RecordingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> Value {
        serde_json::json!({"type": "object"})
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput> {
        self.calls.lock().unwrap().push(args);
        Ok(self.output.clone())
    }
}

/// Registry backed by a vector of tools.
#[derive(Default)]
pub struct MockToolRegistry {
    tools: Mutex<Vec<Arc<dyn Tool>>>,
}

impl MockToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry advertising the given names, each returning a text success.
    pub fn with_names(names: &[&str]) -> Self {
        let registry = Self::new();
        {
            let mut tools = registry.tools.lock().unwrap();
            for name in names {
                tools.push(Arc::new(RecordingTool::new(
                    name,
                    ToolOutput::text(format!("{} done", name)),
                )));
            }
        }
        registry
    }

    pub fn add(&self, tool: Arc<dyn Tool>) {
        self.tools.lock().unwrap().push(tool);
    }
}

#[async_trait]
impl ToolRegistry for MockToolRegistry {
    async fn register(&self, tool: Box<dyn Tool>) -> Result<()> {
        self.tools.lock().unwrap().push(Arc::from(tool));
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ToolDefinition>> {
        let tools = self.tools.lock().unwrap();
        Ok(tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters(),
            })
            .collect())
    }

    async fn execute(&self, name: &str, args: Value) -> Result<ToolOutput> {
        let tool = {
            let tools = self.tools.lock().unwrap();
            tools.iter().find(|t| t.name() == name).cloned()
        };
        match tool {
            Some(tool) => tool.execute(args).await,
            None => Err(Error::tool_not_found(name)),
        }
    }
}

// =============================================================================
// Mock Execution Coordinator
// =============================================================================

/// Coordinator that returns scripted results and records the plans it saw.
pub struct MockExecutor {
    results: Mutex<Option<Vec<StepResult>>>,
    plans: Mutex<Vec<Plan>>,
    contexts: Mutex<Vec<String>>,
}

impl MockExecutor {
    /// Return these results for the next execution.
    pub fn with_results(results: Vec<StepResult>) -> Self {
        Self {
            results: Mutex::new(Some(results)),
            plans: Mutex::new(Vec::new()),
            contexts: Mutex::new(Vec::new()),
        }
    }

    /// Return one success per step.
    pub fn succeeding() -> Self {
        Self {
            results: Mutex::new(None),
            plans: Mutex::new(Vec::new()),
            contexts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.plans.lock().unwrap().len()
    }

    pub fn executed_plans(&self) -> Vec<Plan> {
        self.plans.lock().unwrap().clone()
    }

    /// Rendered planning context passed with each execution.
    pub fn contexts(&self) -> Vec<String> {
        self.contexts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutionCoordinator for MockExecutor {
    async fn execute(
        &self,
        _goal: &str,
        plan: &Plan,
        _tools: Arc<dyn ToolRegistry>,
        context: &str,
    ) -> Result<ExecutionReport> {
        self.plans.lock().unwrap().push(plan.clone());
        self.contexts.lock().unwrap().push(context.to_string());
        let results = match self.results.lock().unwrap().clone() {
            Some(results) => results,
            None => plan
                .iter()
                .map(|s| StepResult::success(format!("{} ok", s.tool_name)))
                .collect(),
        };
        Ok(ExecutionReport {
            final_plan: plan.clone(),
            results,
        })
    }
}

// =============================================================================
// Mock Decomposer
// =============================================================================

/// Decomposer returning a fixed project plan and counting invocations.
pub struct MockDecomposer {
    steps: Vec<ProjectPlanStep>,
    call_count: Mutex<usize>,
}

impl MockDecomposer {
    pub fn new(steps: Vec<ProjectPlanStep>) -> Self {
        Self {
            steps,
            call_count: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl ProjectDecomposer for MockDecomposer {
    async fn generate_full_project_plan(
        &self,
        _goal: &str,
        _context: &str,
    ) -> Result<Vec<ProjectPlanStep>> {
        *self.call_count.lock().unwrap() += 1;
        Ok(self.steps.clone())
    }
}

// =============================================================================
// Mock Task Tracker / Self Modifier / Fact Store
// =============================================================================

/// Task tracker that hands out sequential ids.
#[derive(Default)]
pub struct MockTaskTracker {
    created: Mutex<Vec<(String, TaskType, Value)>>,
    updates: Mutex<Vec<(String, TaskStatus)>>,
}

impl MockTaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> Vec<(String, TaskType, Value)> {
        self.created.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<(String, TaskStatus)> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskTracker for MockTaskTracker {
    async fn create_task(
        &self,
        description: &str,
        task_type: TaskType,
        details: Value,
    ) -> Result<String> {
        let mut created = self.created.lock().unwrap();
        created.push((description.to_string(), task_type, details));
        Ok(format!("task-{}", created.len()))
    }

    async fn update_status(&self, id: &str, status: TaskStatus) -> Result<()> {
        let known = self.created.lock().unwrap().len();
        let valid = id
            .strip_prefix("task-")
            .and_then(|n| n.parse::<usize>().ok())
            .map_or(false, |n| n >= 1 && n <= known);
        if !valid {
            return Err(Error::storage(format!("Task not found: {}", id)));
        }
        self.updates.lock().unwrap().push((id.to_string(), status));
        Ok(())
    }
}

/// Self-modifier with a fixed verdict.
pub struct MockSelfModifier {
    accept: bool,
    applied: Mutex<Vec<StagedProposal>>,
}

impl MockSelfModifier {
    pub fn accepting() -> Self {
        Self {
            accept: true,
            applied: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            accept: false,
            applied: Mutex::new(Vec::new()),
        }
    }

    pub fn proposals(&self) -> Vec<StagedProposal> {
        self.applied.lock().unwrap().clone()
    }
}

#[async_trait]
impl SelfModifier for MockSelfModifier {
    async fn apply(&self, proposal: &StagedProposal) -> Result<bool> {
        self.applied.lock().unwrap().push(proposal.clone());
        Ok(self.accept)
    }
}

/// Fact store returning a fixed list and recording the keywords it was given.
#[derive(Default)]
pub struct MockFactStore {
    facts: Vec<Fact>,
    queries: Mutex<Vec<Vec<String>>>,
}

impl MockFactStore {
    pub fn new(facts: Vec<Fact>) -> Self {
        Self {
            facts,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<Vec<String>> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl FactStore for MockFactStore {
    async fn retrieve_relevant(&self, keywords: &[String]) -> Result<Vec<Fact>> {
        self.queries.lock().unwrap().push(keywords.to_vec());
        Ok(self.facts.clone())
    }
}
