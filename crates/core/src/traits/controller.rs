//! Orchestration collaborator traits.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::error::Result;
use crate::traits::ToolRegistry;
use crate::types::{ExecutionReport, Plan, ProjectPlanStep, StagedProposal};

/// Runs a validated plan and reports per-step results.
#[async_trait]
pub trait ExecutionCoordinator: Send + Sync {
    /// Execute `plan` for `goal` against `tools`.
    ///
    /// May retry or replan internally; `context` is the rendered planning
    /// context of the request. The returned report names the plan that was
    /// finally attempted.
    async fn execute(
        &self,
        goal: &str,
        plan: &Plan,
        tools: Arc<dyn ToolRegistry>,
        context: &str,
    ) -> Result<ExecutionReport>;
}

/// Multi-level decomposition of a goal into a project plan.
#[async_trait]
pub trait ProjectDecomposer: Send + Sync {
    /// Outline, detail, and elaborate `goal`. An empty result means no plan.
    async fn generate_full_project_plan(
        &self,
        goal: &str,
        context: &str,
    ) -> Result<Vec<ProjectPlanStep>>;
}

/// Applies staged self-modification proposals.
#[async_trait]
pub trait SelfModifier: Send + Sync {
    /// Returns whether the proposal was applied.
    async fn apply(&self, proposal: &StagedProposal) -> Result<bool>;
}

/// Kind of tracked task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Project,
    Goal,
}

/// Lifecycle of a tracked task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// Records long-running tasks.
#[async_trait]
pub trait TaskTracker: Send + Sync {
    /// Create a `Pending` tracking record and return its id.
    async fn create_task(&self, description: &str, task_type: TaskType, details: Value)
        -> Result<String>;

    /// Move a task along its lifecycle. Unknown ids are an error.
    async fn update_status(&self, id: &str, status: TaskStatus) -> Result<()>;
}
