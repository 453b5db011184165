//! Hierarchical decomposition: outline, then tasks per phase, then one
//! typed step per task.
//!
//! Every stage is a single generator call and runs strictly in order. Failed
//! elaborations are dropped but still consume their task number, so step ids
//! may skip (`1.1`, `1.3`).

use async_trait::async_trait;
use std::sync::Arc;

use goal_agent_core::{
    traits::{LlmClient, ProjectDecomposer},
    types::{ProjectPlanStep, ProjectStepKind},
    Error, Result,
};

use crate::normalize::normalize;
use crate::parser::parse_list;
use crate::prompts;

/// Generator-backed project decomposer.
pub struct HierarchicalPlanner {
    llm: Arc<dyn LlmClient>,
}

impl HierarchicalPlanner {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Phase titles for the goal; empty on any failure.
    pub async fn generate_outline(&self, goal: &str, context: &str) -> Vec<String> {
        self.list_stage("outline", &prompts::outline(goal, context))
            .await
    }

    /// Concrete tasks for one phase; empty on any failure.
    pub async fn generate_tasks(&self, goal: &str, phase: &str, context: &str) -> Vec<String> {
        self.list_stage("tasks", &prompts::detailed_tasks(goal, phase, context))
            .await
    }

    /// Typed step record for one task.
    pub async fn elaborate(&self, goal: &str, task: &str, context: &str) -> Result<ProjectStepKind> {
        let response = self
            .llm
            .complete(&prompts::elaboration(goal, task, context))
            .await?;

        if response.content.trim().is_empty() {
            return Err(Error::hierarchical("elaboration response was empty"));
        }

        serde_json::from_str::<ProjectStepKind>(&normalize(&response.content))
            .map_err(|e| Error::hierarchical(format!("malformed elaboration record: {}", e)))
    }

    async fn list_stage(&self, stage: &'static str, instruction: &str) -> Vec<String> {
        match self.llm.complete(instruction).await {
            Ok(response) => parse_list(&response.content),
            Err(e) => {
                tracing::warn!(stage, error = %e, "Decomposition stage failed");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl ProjectDecomposer for HierarchicalPlanner {
    async fn generate_full_project_plan(
        &self,
        goal: &str,
        context: &str,
    ) -> Result<Vec<ProjectPlanStep>> {
        let outline = self.generate_outline(goal, context).await;
        if outline.is_empty() {
            tracing::warn!(goal, "Outline stage produced no phases");
            return Ok(Vec::new());
        }
        tracing::info!(phases = outline.len(), "Project outline generated");

        let mut steps = Vec::new();
        for (phase_idx, phase) in outline.iter().enumerate() {
            let tasks = self.generate_tasks(goal, phase, context).await;
            if tasks.is_empty() {
                tracing::info!(phase = %phase, "Phase produced no tasks; skipping");
                continue;
            }

            for (task_idx, task) in tasks.iter().enumerate() {
                let step_id = ProjectPlanStep::step_id_for(phase_idx + 1, task_idx + 1);

                match self.elaborate(goal, task, context).await {
                    Ok(kind) => steps.push(ProjectPlanStep {
                        step_id,
                        description: task.clone(),
                        kind,
                        outline_group: phase.clone(),
                    }),
                    Err(e) => {
                        tracing::warn!(step_id = %step_id, task = %task, error = %e, "Dropping task");
                    }
                }
            }
        }

        tracing::info!(steps = steps.len(), "Project plan assembled");
        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goal_agent_core::mocks::MockLlm;

    #[tokio::test]
    async fn test_empty_outline_yields_empty_plan() {
        let llm = Arc::new(MockLlm::new(vec!["\n  \n"]));
        let planner = HierarchicalPlanner::new(llm.clone());

        let steps = planner
            .generate_full_project_plan("develop a project", "")
            .await
            .unwrap();

        assert!(steps.is_empty());
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_elaboration_accepts_fenced_record() {
        let llm = Arc::new(MockLlm::new(vec![
            "```json\n{\"type\": \"informational\", \"details\": {\"message\": \"Done\"}}\n```",
        ]));
        let planner = HierarchicalPlanner::new(llm);

        let kind = planner.elaborate("g", "t", "").await.unwrap();
        assert_eq!(kind.type_name(), "informational");
    }

    #[tokio::test]
    async fn test_elaboration_rejects_unknown_type() {
        let llm = Arc::new(MockLlm::new(vec![
            "{\"type\": \"teleport\", \"details\": {}}",
        ]));
        let planner = HierarchicalPlanner::new(llm);

        assert!(planner.elaborate("g", "t", "").await.is_err());
    }
}
