use serde::{Deserialize, Serialize};

// =============================================================================
// Hierarchical Project Plan Types
// =============================================================================

/// One elaborated step of a hierarchical project plan.
///
/// `step_id` is `"<phase>.<task>"`, both 1-based. Ids are never renumbered:
/// a task whose elaboration was dropped leaves a gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPlanStep {
    pub step_id: String,
    pub description: String,
    #[serde(flatten)]
    pub kind: ProjectStepKind,
    /// Title of the phase this step came from.
    pub outline_group: String,
}

impl ProjectPlanStep {
    /// Build the dotted step id for a phase/task pair (both 1-based).
    pub fn step_id_for(phase: usize, task: usize) -> String {
        format!("{}.{}", phase, task)
    }

    /// Wire name of this step's type.
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// Typed payload of an elaborated step, serialized as `{type, details}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details", rename_all = "snake_case")]
pub enum ProjectStepKind {
    /// Generate and run a script.
    #[serde(alias = "python_script")]
    ScriptExecution(ScriptDetails),

    /// Pause for a human decision.
    HumanReviewGate(ReviewGateDetails),

    /// Deliver a message, nothing to run.
    Informational(InformationalDetails),
}

impl ProjectStepKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::ScriptExecution(_) => "script_execution",
            Self::HumanReviewGate(_) => "human_review_gate",
            Self::Informational(_) => "informational",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptDetails {
    /// Instruction used to generate the script content.
    pub script_content_prompt: String,
    #[serde(default)]
    pub input_files: Vec<String>,
    #[serde(default)]
    pub output_files_to_capture: Vec<String>,
    #[serde(default = "default_script_timeout")]
    pub timeout_seconds: u64,
}

fn default_script_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewGateDetails {
    pub prompt_to_user: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InformationalDetails {
    pub message: String,
}
