//! Builder for Orchestrator.

use std::sync::Arc;

use goal_agent_core::{
    traits::{
        ExecutionCoordinator, FactStore, LlmClient, ProjectDecomposer, SelfModifier,
        TaskTracker, ToolRegistry,
    },
    Error, Result,
};

use crate::executor::{ExecutorConfig, SequentialExecutor};
use crate::orchestrator::{Orchestrator, OrchestratorConfig};
use crate::planning::{PlanGenerator, DEFAULT_MAX_CORRECTIONS};
use crate::synthesis::ResponseSynthesizer;

/// Builder for constructing an Orchestrator.
///
/// Only the LLM client and the tool registry are required. Without an
/// explicit executor a replanning [`SequentialExecutor`] is used; the summary
/// generator defaults to the planning LLM.
pub struct OrchestratorBuilder {
    config: OrchestratorConfig,
    max_correction_attempts: usize,
    llm: Option<Arc<dyn LlmClient>>,
    summary_llm: Option<Option<Arc<dyn LlmClient>>>,
    tools: Option<Arc<dyn ToolRegistry>>,
    executor: Option<Arc<dyn ExecutionCoordinator>>,
    executor_config: ExecutorConfig,
    decomposer: Option<Arc<dyn ProjectDecomposer>>,
    task_tracker: Option<Arc<dyn TaskTracker>>,
    self_modifier: Option<Arc<dyn SelfModifier>>,
    fact_store: Option<Arc<dyn FactStore>>,
}

impl OrchestratorBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: OrchestratorConfig::default(),
            max_correction_attempts: DEFAULT_MAX_CORRECTIONS,
            llm: None,
            summary_llm: None,
            tools: None,
            executor: None,
            executor_config: ExecutorConfig::default(),
            decomposer: None,
            task_tracker: None,
            self_modifier: None,
            fact_store: None,
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set how many correction calls may follow an initial plan request.
    pub fn with_max_corrections(mut self, attempts: usize) -> Self {
        self.max_correction_attempts = attempts;
        self
    }

    /// Set the LLM client used for planning and conversation.
    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Set the LLM used for summaries and rephrasing; `None` disables both.
    pub fn with_summary_llm(mut self, llm: Option<Arc<dyn LlmClient>>) -> Self {
        self.summary_llm = Some(llm);
        self
    }

    /// Set the tool registry.
    pub fn with_tools(mut self, tools: Arc<dyn ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Set the execution coordinator.
    pub fn with_executor(mut self, executor: Arc<dyn ExecutionCoordinator>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Configure the default executor; ignored when an executor is set.
    pub fn with_executor_config(mut self, config: ExecutorConfig) -> Self {
        self.executor_config = config;
        self
    }

    /// Enable escalation to hierarchical planning.
    pub fn with_decomposer(mut self, decomposer: Arc<dyn ProjectDecomposer>) -> Self {
        self.decomposer = Some(decomposer);
        self
    }

    /// Set the task tracker used for delegated project plans.
    pub fn with_task_tracker(mut self, tracker: Arc<dyn TaskTracker>) -> Self {
        self.task_tracker = Some(tracker);
        self
    }

    /// Set the self-modification collaborator.
    pub fn with_self_modifier(mut self, modifier: Arc<dyn SelfModifier>) -> Self {
        self.self_modifier = Some(modifier);
        self
    }

    /// Set the fact store used for planning context.
    pub fn with_fact_store(mut self, store: Arc<dyn FactStore>) -> Self {
        self.fact_store = Some(store);
        self
    }

    /// Build the Orchestrator.
    pub fn build(self) -> Result<Orchestrator> {
        let llm = self
            .llm
            .ok_or_else(|| Error::orchestration("LLM client not configured"))?;
        let tools = self
            .tools
            .ok_or_else(|| Error::orchestration("tool registry not configured"))?;

        let planner = Arc::new(
            PlanGenerator::new(llm.clone()).with_max_corrections(self.max_correction_attempts),
        );
        let executor: Arc<dyn ExecutionCoordinator> = match self.executor {
            Some(executor) => executor,
            None => Arc::new(
                SequentialExecutor::new(self.executor_config).with_replanner(planner.clone()),
            ),
        };
        let summary_llm = self.summary_llm.unwrap_or_else(|| Some(llm.clone()));

        Ok(Orchestrator {
            config: self.config,
            planner,
            conversation_llm: llm,
            tools,
            executor,
            decomposer: self.decomposer,
            task_tracker: self.task_tracker,
            self_modifier: self.self_modifier,
            fact_store: self.fact_store,
            synthesizer: ResponseSynthesizer::new(summary_llm),
        })
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goal_agent_core::mocks::{MockLlm, MockToolRegistry};

    #[test]
    fn test_build_requires_llm_and_tools() {
        assert!(OrchestratorBuilder::new().build().is_err());
        assert!(OrchestratorBuilder::new()
            .with_llm(Arc::new(MockLlm::constant("[]")))
            .build()
            .is_err());
        assert!(OrchestratorBuilder::new()
            .with_llm(Arc::new(MockLlm::constant("[]")))
            .with_tools(Arc::new(MockToolRegistry::new()))
            .build()
            .is_ok());
    }

    #[test]
    fn test_complexity_keywords_from_config() {
        let orchestrator = Orchestrator::builder()
            .with_llm(Arc::new(MockLlm::constant("[]")))
            .with_tools(Arc::new(MockToolRegistry::new()))
            .build()
            .unwrap();

        assert!(orchestrator.is_complex_goal("Develop a new PROJECT for tracking"));
        assert!(orchestrator.is_complex_goal("please create a game about cats"));
        assert!(!orchestrator.is_complex_goal("Please greet John"));
    }
}
