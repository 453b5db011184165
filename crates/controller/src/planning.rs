//! Flat plan generation with bounded correction retries.
//!
//! One generation call, then up to `max_correction_attempts` more calls whose
//! instruction embeds the goal, the rejected response, and what was wrong
//! with it. Running out of attempts yields an empty plan, never an error.

use std::sync::Arc;

use goal_agent_core::{
    traits::LlmClient,
    types::{CapabilitySnapshot, Plan},
};
use goal_agent_governance::metrics::track_plan_attempt;

use crate::context::PlanningContext;
use crate::parser::parse_plan;
use crate::prompts;

/// Default number of correction attempts after the initial call.
pub const DEFAULT_MAX_CORRECTIONS: usize = 1;

/// Turns goals into validated flat plans.
pub struct PlanGenerator {
    llm: Arc<dyn LlmClient>,
    max_correction_attempts: usize,
}

impl PlanGenerator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            max_correction_attempts: DEFAULT_MAX_CORRECTIONS,
        }
    }

    /// Set how many correction calls may follow the initial one.
    pub fn with_max_corrections(mut self, attempts: usize) -> Self {
        self.max_correction_attempts = attempts;
        self
    }

    /// Produce a validated plan for `goal`, or an empty plan.
    pub async fn generate_plan(
        &self,
        goal: &str,
        capabilities: &CapabilitySnapshot,
        context: &PlanningContext,
    ) -> Plan {
        let instruction = prompts::initial_plan(goal, capabilities, context);
        self.generate_with_corrections("plan", goal, instruction, capabilities)
            .await
    }

    /// Produce a new plan after a failed attempt, steered by `failure_analysis`.
    pub async fn replan_after_failure(
        &self,
        goal: &str,
        failure_analysis: &str,
        capabilities: &CapabilitySnapshot,
        context: &str,
    ) -> Plan {
        let instruction = prompts::replan(goal, failure_analysis, capabilities, context);
        self.generate_with_corrections("replan", goal, instruction, capabilities)
            .await
    }

    async fn generate_with_corrections(
        &self,
        purpose: &'static str,
        goal: &str,
        initial_instruction: String,
        capabilities: &CapabilitySnapshot,
    ) -> Plan {
        let total_attempts = 1 + self.max_correction_attempts;
        let mut instruction = initial_instruction;

        for attempt in 1..=total_attempts {
            tracing::debug!(purpose, attempt, total_attempts, "Requesting plan from generator");

            let raw = match self.llm.complete(&instruction).await {
                Ok(response) => response.content,
                Err(e) => {
                    tracing::warn!(purpose, attempt, error = %e, "Generator call failed; treating as empty response");
                    String::new()
                }
            };

            match parse_plan(&raw, capabilities) {
                Ok(plan) => {
                    track_plan_attempt(purpose, "accepted");
                    tracing::info!(purpose, attempt, steps = plan.len(), "Plan accepted");
                    return plan;
                }
                Err(defect) => {
                    track_plan_attempt(purpose, "rejected");
                    tracing::warn!(purpose, attempt, error = %defect, "Plan rejected");

                    if attempt < total_attempts {
                        instruction =
                            prompts::correction(goal, capabilities, &raw, &defect.to_string());
                    }
                }
            }
        }

        tracing::warn!(purpose, total_attempts, "Plan generation exhausted; returning empty plan");
        Plan::empty()
    }
}
