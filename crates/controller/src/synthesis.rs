//! Turning orchestration outcomes into user-facing text.
//!
//! Every response site follows the same two-tier discipline through
//! [`primary_or_else`]: a generative text first, a deterministic one when the
//! generator is missing, fails, or says nothing. Failure responses always
//! carry the technical step summary.

use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

use goal_agent_core::{
    traits::LlmClient,
    types::{OrchestrationOutcome, Plan, StepResult},
    Error, Result,
};

use crate::prompts;

pub const SUCCESS_PREAMBLE: &str = "Successfully completed the task.";
pub const NO_ACTIONS: &str = "No actions were planned or taken.";
pub const CLARIFICATION_TOOL: &str = "request_user_clarification";

const ARG_PREVIEW_CHARS: usize = 25;
const OUTCOME_PREVIEW_CHARS: usize = 100;

/// Await `primary`; fall back to `secondary` when it errors or is blank.
///
/// `secondary` is only polled when needed.
pub async fn primary_or_else<P, S>(label: &'static str, primary: P, secondary: S) -> String
where
    P: Future<Output = Result<String>>,
    S: Future<Output = String>,
{
    match primary.await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            tracing::debug!(label, "Generative text was empty; using fallback");
            secondary.await
        }
        Err(e) => {
            tracing::warn!(label, error = %e, "Generative text failed; using fallback");
            secondary.await
        }
    }
}

/// Builds final responses.
pub struct ResponseSynthesizer {
    llm: Option<Arc<dyn LlmClient>>,
}

impl ResponseSynthesizer {
    pub fn new(llm: Option<Arc<dyn LlmClient>>) -> Self {
        Self { llm }
    }

    /// Response for an executed plan.
    pub async fn synthesize(&self, goal: &str, outcome: &OrchestrationOutcome) -> String {
        if let Some(question) = clarification_question(&outcome.final_plan) {
            return question;
        }

        primary_or_else(
            "summary",
            self.generative_summary(goal, &outcome.final_plan, &outcome.results, outcome.overall_success),
            self.technical_response(
                goal,
                &outcome.final_plan,
                &outcome.results,
                outcome.first_failure(),
                outcome.overall_success,
            ),
        )
        .await
    }

    /// Response when no plan could be produced.
    pub async fn no_plan_failure(&self, goal: &str, error: &Error) -> String {
        self.failure_response(goal, &error.to_string()).await
    }

    /// Response for an error that escaped the control loop.
    pub async fn uncaught_failure(&self, goal: &str, error: &Error) -> String {
        let detail = format!("Error during orchestration: {}", error);
        self.failure_response(goal, &detail).await
    }

    /// Rephrased error, the raw detail when the rephrasing dropped it, then
    /// the empty-plan summary.
    async fn failure_response(&self, goal: &str, detail: &str) -> String {
        let mut message = self.rephrase(goal, detail).await;
        if !message.contains(detail) {
            message = format!("{}\n\nTechnical detail: {}", message, detail);
        }
        format!("{}\n\n{}", message, technical_summary(&Plan::empty(), &[]))
    }

    /// Preamble plus the deterministic step summary.
    async fn technical_response(
        &self,
        goal: &str,
        plan: &Plan,
        results: &[StepResult],
        failure_detail: Option<&str>,
        success: bool,
    ) -> String {
        let preamble = if success {
            SUCCESS_PREAMBLE.to_string()
        } else {
            let detail = failure_detail.unwrap_or("The task did not complete.");
            self.rephrase(goal, detail).await
        };
        format!("{}\n\n{}", preamble, technical_summary(plan, results))
    }

    /// Friendly version of a technical error, or the raw detail.
    async fn rephrase(&self, goal: &str, detail: &str) -> String {
        primary_or_else(
            "rephrase",
            self.generate(prompts::rephrase_error(goal, detail)),
            async { detail.to_string() },
        )
        .await
    }

    async fn generative_summary(
        &self,
        goal: &str,
        plan: &Plan,
        results: &[StepResult],
        success: bool,
    ) -> Result<String> {
        let plan_json = serde_json::to_string_pretty(plan)?;
        let results_json = serde_json::to_string_pretty(results)?;
        self.generate(prompts::summary(goal, &plan_json, &results_json, success))
            .await
    }

    async fn generate(&self, instruction: String) -> Result<String> {
        match &self.llm {
            Some(llm) => Ok(llm.complete(&instruction).await?.content),
            None => Ok(String::new()),
        }
    }
}

/// Deterministic per-step account of a plan and its results.
pub fn technical_summary(plan: &Plan, results: &[StepResult]) -> String {
    if plan.is_empty() {
        return NO_ACTIONS.to_string();
    }

    let mut out = String::from("Here's a summary of what I did:");
    for (idx, step) in plan.iter().enumerate() {
        let args = step
            .args
            .iter()
            .map(|a| format!("'{}'", truncate(a, ARG_PREVIEW_CHARS)))
            .collect::<Vec<_>>()
            .join(", ");

        let outcome = match results.get(idx) {
            Some(StepResult::Success { value }) => format!(
                "Succeeded (Result: {})",
                truncate(&render_value(value), OUTCOME_PREVIEW_CHARS)
            ),
            Some(StepResult::Failure { message, .. }) => {
                format!("Failed (Error: {})", truncate(message, OUTCOME_PREVIEW_CHARS))
            }
            Some(StepResult::StagedProposal { proposal }) => format!(
                "Staged a modification for '{}' that was never reviewed.",
                proposal.target_tool
            ),
            None => "No result recorded for this step.".to_string(),
        };

        out.push_str(&format!(
            "\n- Ran '{}' with arguments ({}): {}",
            step.tool_name, args, outcome
        ));
    }
    out
}

/// A lone clarification step answers with its question.
fn clarification_question(plan: &Plan) -> Option<String> {
    match plan.steps() {
        [step] if step.tool_name == CLARIFICATION_TOOL => step
            .args
            .first()
            .or_else(|| step.kwargs.get("question"))
            .cloned(),
        _ => None,
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max_chars).collect();
        cut.push_str("...");
        cut
    }
}
