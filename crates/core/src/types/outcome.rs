use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::plan::Plan;

// =============================================================================
// Execution Results
// =============================================================================

/// Classification of a failed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The capability ran and reported failure.
    Tool,
    /// The capability could not be invoked or raised an error.
    Exception,
    /// A staged self-modification proposal was rejected or could not be applied.
    SelfModification,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Tool => "tool",
            Self::Exception => "exception",
            Self::SelfModification => "self_modification",
        };
        f.write_str(s)
    }
}

/// A pending code modification produced by a step, awaiting the
/// self-modification pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedProposal {
    /// Capability the proposal targets.
    pub target_tool: String,
    /// Opaque proposal payload.
    pub details: Value,
}

/// Outcome of one executed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepResult {
    Success { value: Value },
    Failure { kind: FailureKind, message: String },
    /// Tagged by the execution coordinator; the control loop replaces it
    /// with the self-modification outcome before synthesis.
    StagedProposal { proposal: StagedProposal },
}

impl StepResult {
    pub fn success(value: impl Into<Value>) -> Self {
        Self::Success {
            value: value.into(),
        }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// Technical detail of a failure, if this is one.
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Failure { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// What the execution coordinator hands back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// The plan that was finally attempted (may differ after internal replanning).
    pub final_plan: Plan,
    /// One result per attempted step, in order; may be shorter than the plan.
    pub results: Vec<StepResult>,
}

// =============================================================================
// Orchestration Outcome
// =============================================================================

/// Result of one orchestration request, held only until synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationOutcome {
    pub final_plan: Plan,
    pub results: Vec<StepResult>,
    pub overall_success: bool,
}

impl OrchestrationOutcome {
    /// Derive overall success from a plan and its results.
    ///
    /// Fails when any result failed, or when fewer results than steps came back.
    pub fn evaluate(final_plan: Plan, results: Vec<StepResult>) -> Self {
        let truncated = results.len() < final_plan.len();
        let any_failed = results.iter().any(StepResult::is_failure);
        let overall_success = !truncated && !any_failed;
        Self {
            final_plan,
            results,
            overall_success,
        }
    }

    /// First failure detail in result order.
    pub fn first_failure(&self) -> Option<&str> {
        self.results.iter().find_map(StepResult::failure_message)
    }
}
