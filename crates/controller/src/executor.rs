//! Sequential execution coordinator.
//!
//! Runs plan steps one at a time through the tool registry, optionally
//! replanning once a step fails.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use goal_agent_core::{
    traits::{ExecutionCoordinator, ToolRegistry},
    types::{CapabilitySnapshot, ExecutionReport, FailureKind, Plan, Step, StepResult},
    Error, Result,
};

use crate::planning::PlanGenerator;

/// Execution behavior.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Stop at the first failed step.
    pub stop_on_failure: bool,
    /// Replans allowed per execution when a replanner is set.
    pub max_replans: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            stop_on_failure: true,
            max_replans: 1,
        }
    }
}

impl From<&goal_agent_core::config::ExecutorConfig> for ExecutorConfig {
    fn from(cfg: &goal_agent_core::config::ExecutorConfig) -> Self {
        Self {
            stop_on_failure: cfg.stop_on_failure,
            max_replans: cfg.max_replans,
        }
    }
}

/// Default execution coordinator.
pub struct SequentialExecutor {
    config: ExecutorConfig,
    replanner: Option<Arc<PlanGenerator>>,
}

impl SequentialExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            config,
            replanner: None,
        }
    }

    /// Replan with `planner` after a failed step.
    pub fn with_replanner(mut self, planner: Arc<PlanGenerator>) -> Self {
        self.replanner = Some(planner);
        self
    }

    async fn run_steps(&self, plan: &Plan, tools: &Arc<dyn ToolRegistry>) -> Vec<StepResult> {
        let mut results = Vec::with_capacity(plan.len());

        for (idx, step) in plan.iter().enumerate() {
            tracing::info!(step = idx + 1, tool = %step.tool_name, "Executing step");

            let result = match tools.execute(&step.tool_name, step_arguments(step)).await {
                Ok(output) => match output.staged_proposal {
                    Some(proposal) => StepResult::StagedProposal { proposal },
                    None if output.success => {
                        StepResult::success(output.data.unwrap_or(Value::String(output.content)))
                    }
                    None => StepResult::failure(FailureKind::Tool, output.content),
                },
                Err(e) => StepResult::failure(FailureKind::Exception, e.to_string()),
            };

            let failed = result.is_failure();
            if failed {
                tracing::warn!(step = idx + 1, tool = %step.tool_name, "Step failed");
            }
            results.push(result);

            if failed && self.config.stop_on_failure {
                break;
            }
        }

        results
    }
}

impl Default for SequentialExecutor {
    fn default() -> Self {
        Self::new(ExecutorConfig::default())
    }
}

#[async_trait]
impl ExecutionCoordinator for SequentialExecutor {
    async fn execute(
        &self,
        goal: &str,
        plan: &Plan,
        tools: Arc<dyn ToolRegistry>,
        context: &str,
    ) -> Result<ExecutionReport> {
        let mut current = plan.clone();
        let mut replans = 0;

        loop {
            let results = self.run_steps(&current, &tools).await;

            let replanner = match &self.replanner {
                Some(r) if replans < self.config.max_replans => r,
                _ => return Ok(report(current, results)),
            };
            let analysis = match failure_analysis(&current, &results) {
                Some(analysis) => analysis,
                None => return Ok(report(current, results)),
            };

            tracing::info!(replans, analysis = %analysis, "Replanning after failure");
            let capabilities = CapabilitySnapshot::new(tools.list().await?);
            let next = replanner
                .replan_after_failure(goal, &analysis, &capabilities, context)
                .await;
            replans += 1;

            if next.is_empty() {
                tracing::warn!("Replanning produced no plan; keeping the failed attempt");
                return Ok(report(current, results));
            }
            current = next;
        }
    }
}

fn report(final_plan: Plan, results: Vec<StepResult>) -> ExecutionReport {
    ExecutionReport {
        final_plan,
        results,
    }
}

/// Wire form handed to tools: `{"args": [..], "kwargs": {..}}`.
pub fn step_arguments(step: &Step) -> Value {
    json!({
        "args": step.args,
        "kwargs": step.kwargs,
    })
}

fn failure_analysis(plan: &Plan, results: &[StepResult]) -> Option<String> {
    results.iter().enumerate().find_map(|(idx, result)| {
        let message = result.failure_message()?;
        let tool = plan
            .steps()
            .get(idx)
            .map(|s| s.tool_name.as_str())
            .unwrap_or("unknown");
        let failure = Error::execution_step(format!("step {} ('{}'): {}", idx + 1, tool, message));
        Some(failure.to_string())
    })
}
