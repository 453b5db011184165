//! Orchestration control loop.
//!
//! One request moves through these states:
//!
//! ```text
//! FlatPlanAttempt ──non-empty──────────────────────────────► Execute ──► Synthesize
//!        │ empty
//!        ├── simple goal ──► ConversationalFallback ──reply──► (returned as is)
//!        │                          └── no reply ──► TerminalFailure
//!        ├── complex, no decomposer ──────────────► TerminalFailure
//!        └── complex ──► HierarchicalAttempt ──tracked──► Execute
//!                               ├── empty plan ───► TerminalFailure
//!                               └── no tracker ───► TerminalFailure
//! ```
//!
//! Errors that escape any state are caught once in [`Orchestrator::process`]
//! and sent to the rephrasing path. `process` never fails.

use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

use goal_agent_core::{
    traits::{
        ChatMessage, ExecutionCoordinator, FactStore, LlmClient, ProjectDecomposer,
        SelfModifier, TaskTracker, TaskType, ToolRegistry,
    },
    types::{
        CapabilitySnapshot, ConversationWindow, FailureKind, OrchestrationOutcome, Plan,
        ProjectPlanStep, StagedProposal, Step, StepResult,
    },
    Error, Result,
};
use goal_agent_governance::metrics::{track_escalation, track_request};

use crate::context::{goal_keywords, PlanningContext, ProjectContext};
use crate::planning::PlanGenerator;
use crate::prompts;
use crate::synthesis::ResponseSynthesizer;

/// Orchestrator configuration.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Lowercase phrases that make an unplannable goal eligible for escalation.
    pub complexity_keywords: Vec<String>,
    /// Capability that receives a delegated project plan.
    pub project_tool_name: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::from(&goal_agent_core::config::PlannerConfig::default())
    }
}

impl From<&goal_agent_core::config::PlannerConfig> for OrchestratorConfig {
    fn from(cfg: &goal_agent_core::config::PlannerConfig) -> Self {
        Self {
            complexity_keywords: cfg
                .complexity_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            project_tool_name: cfg.project_tool_name.clone(),
        }
    }
}

/// States of one orchestration request.
#[derive(Debug)]
enum State {
    FlatPlanAttempt,
    HierarchicalAttempt,
    Execute(Plan),
    ConversationalFallback,
    TerminalFailure(Error),
}

impl State {
    fn name(&self) -> &'static str {
        match self {
            Self::FlatPlanAttempt => "flat_plan_attempt",
            Self::HierarchicalAttempt => "hierarchical_attempt",
            Self::Execute(_) => "execute",
            Self::ConversationalFallback => "conversational_fallback",
            Self::TerminalFailure(_) => "terminal_failure",
        }
    }
}

/// How a request left the state machine.
enum Flow {
    Replied(String),
    Executed(OrchestrationOutcome),
    NoPlan(Error),
}

/// The planning-and-orchestration core.
pub struct Orchestrator {
    pub(crate) config: OrchestratorConfig,
    pub(crate) planner: Arc<PlanGenerator>,
    pub(crate) conversation_llm: Arc<dyn LlmClient>,
    pub(crate) tools: Arc<dyn ToolRegistry>,
    pub(crate) executor: Arc<dyn ExecutionCoordinator>,
    pub(crate) decomposer: Option<Arc<dyn ProjectDecomposer>>,
    pub(crate) task_tracker: Option<Arc<dyn TaskTracker>>,
    pub(crate) self_modifier: Option<Arc<dyn SelfModifier>>,
    pub(crate) fact_store: Option<Arc<dyn FactStore>>,
    pub(crate) synthesizer: ResponseSynthesizer,
}

impl Orchestrator {
    /// Create a new builder for Orchestrator.
    pub fn builder() -> crate::builder::OrchestratorBuilder {
        crate::builder::OrchestratorBuilder::new()
    }

    /// Handle one goal. `history` is the conversation before this goal.
    pub async fn process(&self, goal: &str, history: &ConversationWindow) -> (bool, String) {
        self.process_in_project(goal, history, None).await
    }

    /// Handle one goal with the user's current project as extra context.
    pub async fn process_in_project(
        &self,
        goal: &str,
        history: &ConversationWindow,
        project: Option<ProjectContext>,
    ) -> (bool, String) {
        tracing::info!(goal, "Processing goal");
        let started = Instant::now();

        let (path, success, text) = match self.run(goal, history, project).await {
            Ok(Flow::Replied(text)) => ("conversational", true, text),
            Ok(Flow::Executed(outcome)) => {
                let text = self.synthesizer.synthesize(goal, &outcome).await;
                ("executed", outcome.overall_success, text)
            }
            Ok(Flow::NoPlan(reason)) => {
                tracing::warn!(error = %reason, "No plan could be produced");
                ("no_plan", false, self.synthesizer.no_plan_failure(goal, &reason).await)
            }
            Err(e) => {
                tracing::error!(error = %e, "Orchestration failed");
                ("error", false, self.synthesizer.uncaught_failure(goal, &e).await)
            }
        };

        track_request(path, success, started.elapsed().as_secs_f64());
        tracing::info!(path, success, "Goal processed");
        (success, text)
    }

    async fn run(
        &self,
        goal: &str,
        history: &ConversationWindow,
        project: Option<ProjectContext>,
    ) -> Result<Flow> {
        let capabilities = CapabilitySnapshot::new(self.tools.list().await?);
        let context = self.build_context(goal, history, project).await;

        let mut state = State::FlatPlanAttempt;
        loop {
            tracing::debug!(state = state.name(), "Orchestration state");

            state = match state {
                State::FlatPlanAttempt => {
                    let plan = self.planner.generate_plan(goal, &capabilities, &context).await;
                    if plan.is_empty() {
                        self.escalation_target(goal)
                    } else {
                        State::Execute(plan)
                    }
                }
                State::HierarchicalAttempt => self.attempt_hierarchical(goal, &context).await?,
                State::Execute(plan) => {
                    return self.execute(goal, plan, &context).await.map(Flow::Executed)
                }
                State::ConversationalFallback => match self.converse(goal, history).await {
                    Ok(reply) => return Ok(Flow::Replied(reply)),
                    Err(e) => State::TerminalFailure(e),
                },
                State::TerminalFailure(reason) => return Ok(Flow::NoPlan(reason)),
            };
        }
    }

    /// Whether the goal mentions any complexity keyword.
    pub fn is_complex_goal(&self, goal: &str) -> bool {
        let goal = goal.to_lowercase();
        self.config
            .complexity_keywords
            .iter()
            .any(|k| goal.contains(k.as_str()))
    }

    fn escalation_target(&self, goal: &str) -> State {
        if !self.is_complex_goal(goal) {
            State::ConversationalFallback
        } else if self.decomposer.is_none() {
            track_escalation("unavailable");
            State::TerminalFailure(Error::escalation_unavailable(
                "the goal needs a multi-step project plan but no hierarchical planner is configured",
            ))
        } else {
            State::HierarchicalAttempt
        }
    }

    async fn attempt_hierarchical(&self, goal: &str, context: &PlanningContext) -> Result<State> {
        let decomposer = match &self.decomposer {
            Some(d) => d,
            None => {
                return Ok(State::TerminalFailure(Error::escalation_unavailable(
                    "no hierarchical planner is configured",
                )))
            }
        };

        let project_plan = decomposer
            .generate_full_project_plan(goal, &context.render())
            .await?;

        if project_plan.is_empty() {
            track_escalation("empty");
            return Ok(State::TerminalFailure(Error::hierarchical(
                "hierarchical planner failed to produce a plan",
            )));
        }

        let tracker = match &self.task_tracker {
            Some(t) => t,
            None => {
                track_escalation("untracked");
                return Ok(State::TerminalFailure(Error::dependency_unavailable(
                    "task tracker unavailable; the project plan cannot be tracked",
                )));
            }
        };

        let task_id = tracker
            .create_task(
                goal,
                TaskType::Project,
                json!({ "goal": goal, "project_plan": &project_plan }),
            )
            .await?;

        track_escalation("delegated");
        tracing::info!(task_id = %task_id, steps = project_plan.len(), "Delegating project plan");
        Ok(State::Execute(self.delegating_plan(goal, &project_plan, &task_id)?))
    }

    /// Wrap a project plan into a single step for the project capability.
    fn delegating_plan(
        &self,
        goal: &str,
        project_plan: &[ProjectPlanStep],
        task_id: &str,
    ) -> Result<Plan> {
        let step = Step::new(self.config.project_tool_name.clone())
            .with_kwarg("project_plan", serde_json::to_string(project_plan)?)
            .with_kwarg("task_id", task_id)
            .with_description(format!("Execute the project plan for: {}", goal));
        Ok(Plan::new(vec![step]))
    }

    async fn execute(
        &self,
        goal: &str,
        plan: Plan,
        context: &PlanningContext,
    ) -> Result<OrchestrationOutcome> {
        let report = self
            .executor
            .execute(goal, &plan, self.tools.clone(), &context.render())
            .await?;

        let mut results = Vec::with_capacity(report.results.len());
        for result in report.results {
            let resolved = match result {
                StepResult::StagedProposal { proposal } => self.dispatch_proposal(&proposal).await,
                other => other,
            };
            results.push(resolved);
        }

        // A rejected proposal is a Failure result, so it already fails the outcome.
        let outcome = OrchestrationOutcome::evaluate(report.final_plan, results);
        tracing::info!(
            steps = outcome.final_plan.len(),
            results = outcome.results.len(),
            success = outcome.overall_success,
            "Execution finished"
        );
        Ok(outcome)
    }

    async fn dispatch_proposal(&self, proposal: &StagedProposal) -> StepResult {
        let modifier = match &self.self_modifier {
            Some(m) => m,
            None => {
                return StepResult::failure(
                    FailureKind::SelfModification,
                    "self-modification collaborator unavailable",
                )
            }
        };

        tracing::info!(target_tool = %proposal.target_tool, "Dispatching staged proposal");
        match modifier.apply(proposal).await {
            Ok(true) => StepResult::success(json!({
                "summary": format!("Applied staged modification to '{}'", proposal.target_tool),
                "applied": true,
            })),
            Ok(false) => StepResult::failure(
                FailureKind::SelfModification,
                format!("staged modification to '{}' was not applied", proposal.target_tool),
            ),
            Err(e) => StepResult::failure(
                FailureKind::SelfModification,
                format!("applying staged modification to '{}' failed: {}", proposal.target_tool, e),
            ),
        }
    }

    async fn converse(&self, goal: &str, history: &ConversationWindow) -> Result<String> {
        let mut messages = vec![ChatMessage::system(prompts::conversation_system())];
        messages.extend(
            history
                .iter()
                .map(|turn| ChatMessage::new(turn.role.as_str(), turn.content.clone())),
        );
        messages.push(ChatMessage::user(goal));

        let reply = self
            .conversation_llm
            .chat(&messages)
            .await
            .map_err(|e| Error::conversational(format!("no plan and no conversational reply ({})", e)))?;

        let reply = reply.content.trim();
        if reply.is_empty() {
            return Err(Error::conversational("no plan and no conversational reply"));
        }
        Ok(reply.to_string())
    }

    async fn build_context(
        &self,
        goal: &str,
        history: &ConversationWindow,
        project: Option<ProjectContext>,
    ) -> PlanningContext {
        let facts = match &self.fact_store {
            Some(store) => match store.retrieve_relevant(&goal_keywords(goal)).await {
                Ok(facts) => facts,
                Err(e) => {
                    tracing::warn!(error = %e, "Fact retrieval failed; planning without facts");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        PlanningContext::new(history)
            .with_project(project)
            .with_facts(facts)
    }
}
