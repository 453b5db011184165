use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use goal_agent_controller::{Orchestrator, Session, SUCCESS_PREAMBLE};
use goal_agent_core::mocks::{
    MockDecomposer, MockExecutor, MockFactStore, MockLlm, MockSelfModifier, MockTaskTracker,
    MockToolRegistry, RecordingTool,
};
use goal_agent_core::traits::{Tool, ToolRegistry};
use goal_agent_core::types::{
    ConversationWindow, Fact, InformationalDetails, ProjectPlanStep, ProjectStepKind,
    StagedProposal, ToolDefinition, ToolOutput,
};
use goal_agent_core::{Error, Result};

const GREET_PLAN: &str = r#"[{"tool_name": "greet_user", "args": ["John"]}]"#;

fn project_steps() -> Vec<ProjectPlanStep> {
    vec![ProjectPlanStep {
        step_id: "1.1".into(),
        description: "Write the README".into(),
        kind: ProjectStepKind::Informational(InformationalDetails {
            message: "README written".into(),
        }),
        outline_group: "Setup".into(),
    }]
}

/// Registry whose listing always fails.
struct OfflineRegistry;

#[async_trait]
impl ToolRegistry for OfflineRegistry {
    async fn register(&self, _tool: Box<dyn Tool>) -> Result<()> {
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ToolDefinition>> {
        Err(Error::internal("registry offline"))
    }

    async fn execute(&self, name: &str, _args: Value) -> Result<ToolOutput> {
        Err(Error::tool_not_found(name))
    }
}

#[tokio::test]
async fn test_greeting_goal_succeeds() -> Result<()> {
    // 1. Planner returns a greet plan, then the summary
    let llm = Arc::new(MockLlm::new(vec![GREET_PLAN, "I greeted John for you."]));
    let tools = Arc::new(MockToolRegistry::with_names(&["greet_user"]));
    let orchestrator = Orchestrator::builder()
        .with_llm(llm.clone())
        .with_tools(tools)
        .build()?;

    // 2. Process
    let (success, reply) = orchestrator
        .process("Please greet John", &ConversationWindow::default())
        .await;

    // 3. Verify
    assert!(success);
    assert_eq!(reply, "I greeted John for you.");
    assert_eq!(llm.call_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_flat_plan_never_escalates() -> Result<()> {
    let decomposer = Arc::new(MockDecomposer::new(project_steps()));
    let orchestrator = Orchestrator::builder()
        .with_llm(Arc::new(MockLlm::new(vec![r#"[{"tool_name": "echo", "args": ["hi"]}]"#])))
        .with_summary_llm(None)
        .with_tools(Arc::new(MockToolRegistry::with_names(&["echo"])))
        .with_decomposer(decomposer.clone())
        .with_task_tracker(Arc::new(MockTaskTracker::new()))
        .build()?;

    // Complex wording, but a flat plan exists
    let (success, reply) = orchestrator
        .process("develop a new project for tracking birds", &ConversationWindow::default())
        .await;

    assert!(success);
    assert!(reply.starts_with(SUCCESS_PREAMBLE));
    assert_eq!(decomposer.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_escalation_without_tracker_fails_before_execution() -> Result<()> {
    // 1. Setup: no flat plan, decomposer available, no tracker
    let decomposer = Arc::new(MockDecomposer::new(project_steps()));
    let executor = Arc::new(MockExecutor::succeeding());
    let orchestrator = Orchestrator::builder()
        .with_llm(Arc::new(MockLlm::constant("[]")))
        .with_summary_llm(None)
        .with_tools(Arc::new(MockToolRegistry::new()))
        .with_executor(executor.clone())
        .with_decomposer(decomposer.clone())
        .build()?;

    // 2. Process
    let (success, reply) = orchestrator
        .process("develop a new project for X", &ConversationWindow::default())
        .await;

    // 3. Verify
    assert!(!success);
    assert!(reply.contains("task tracker unavailable"));
    assert!(reply.contains("No actions were planned or taken."));
    assert_eq!(decomposer.call_count(), 1);
    assert_eq!(executor.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_untracked_escalation_keeps_reason_with_default_summary_llm() -> Result<()> {
    // Planner and rephraser share one generator that only ever says "[]"
    let executor = Arc::new(MockExecutor::succeeding());
    let orchestrator = Orchestrator::builder()
        .with_llm(Arc::new(MockLlm::constant("[]")))
        .with_tools(Arc::new(MockToolRegistry::new()))
        .with_executor(executor.clone())
        .with_decomposer(Arc::new(MockDecomposer::new(project_steps())))
        .build()?;

    let (success, reply) = orchestrator
        .process("develop a new project for X", &ConversationWindow::default())
        .await;

    assert!(!success);
    assert!(reply.contains("task tracker unavailable"), "reply: {}", reply);
    assert!(reply.ends_with("No actions were planned or taken."));
    assert_eq!(executor.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_untracked_escalation_is_rephrased_not_summarized() -> Result<()> {
    let llm = Arc::new(MockLlm::new(vec![
        "[]",
        "I planned the project but had nowhere to track it.",
    ]));
    let orchestrator = Orchestrator::builder()
        .with_llm(llm.clone())
        .with_tools(Arc::new(MockToolRegistry::new()))
        .with_executor(Arc::new(MockExecutor::succeeding()))
        .with_decomposer(Arc::new(MockDecomposer::new(project_steps())))
        .build()?;

    let (success, reply) = orchestrator
        .process("develop a new project for X", &ConversationWindow::default())
        .await;

    assert!(!success);
    assert_eq!(llm.call_count(), 2);
    assert!(llm.prompts()[1].contains("task tracker unavailable"));
    assert!(reply.starts_with("I planned the project but had nowhere to track it."));
    assert!(reply.contains("Technical detail: Dependency unavailable: task tracker unavailable"));
    assert!(reply.ends_with("No actions were planned or taken."));
    Ok(())
}

#[tokio::test]
async fn test_escalation_delegates_tracked_project_plan() -> Result<()> {
    let tracker = Arc::new(MockTaskTracker::new());
    let executor = Arc::new(MockExecutor::succeeding());
    let orchestrator = Orchestrator::builder()
        .with_llm(Arc::new(MockLlm::constant("[]")))
        .with_summary_llm(None)
        .with_tools(Arc::new(MockToolRegistry::new()))
        .with_executor(executor.clone())
        .with_decomposer(Arc::new(MockDecomposer::new(project_steps())))
        .with_task_tracker(tracker.clone())
        .build()?;

    let goal = "develop a new project for X";
    let (success, reply) = orchestrator
        .process(goal, &ConversationWindow::default())
        .await;

    assert!(success);
    assert!(reply.starts_with(SUCCESS_PREAMBLE));

    // One tracked task
    let created = tracker.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].0, goal);

    // One delegating step carrying the serialized plan
    let plans = executor.executed_plans();
    assert_eq!(plans.len(), 1);
    let step = &plans[0].steps()[0];
    assert_eq!(step.tool_name, "execute_project_plan");
    assert_eq!(step.kwargs["task_id"], "task-1");
    assert_eq!(
        step.description.as_deref(),
        Some("Execute the project plan for: develop a new project for X")
    );
    let delegated: Vec<ProjectPlanStep> = serde_json::from_str(&step.kwargs["project_plan"])?;
    assert_eq!(delegated, project_steps());
    Ok(())
}

#[tokio::test]
async fn test_empty_project_plan_is_terminal() -> Result<()> {
    let executor = Arc::new(MockExecutor::succeeding());
    let orchestrator = Orchestrator::builder()
        .with_llm(Arc::new(MockLlm::constant("[]")))
        .with_summary_llm(None)
        .with_tools(Arc::new(MockToolRegistry::new()))
        .with_executor(executor.clone())
        .with_decomposer(Arc::new(MockDecomposer::new(Vec::new())))
        .with_task_tracker(Arc::new(MockTaskTracker::new()))
        .build()?;

    let (success, reply) = orchestrator
        .process("build an app for my team", &ConversationWindow::default())
        .await;

    assert!(!success);
    assert!(reply.contains("hierarchical planner failed to produce a plan"));
    assert_eq!(executor.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_complex_goal_without_decomposer() -> Result<()> {
    let orchestrator = Orchestrator::builder()
        .with_llm(Arc::new(MockLlm::constant("[]")))
        .with_summary_llm(None)
        .with_tools(Arc::new(MockToolRegistry::new()))
        .build()?;

    let (success, reply) = orchestrator
        .process("create a game about cats", &ConversationWindow::default())
        .await;

    assert!(!success);
    assert!(reply.contains("Escalation unavailable"));
    Ok(())
}

#[tokio::test]
async fn test_simple_unplannable_goal_gets_conversational_reply() -> Result<()> {
    let llm = Arc::new(MockLlm::new(vec!["[]", "Most people say 42."]));
    let orchestrator = Orchestrator::builder()
        .with_llm(llm.clone())
        .with_tools(Arc::new(MockToolRegistry::new()))
        .build()?;

    let mut history = ConversationWindow::default();
    history.record_exchange("hi", "Hello! How can I help?");

    let (success, reply) = orchestrator
        .process("What's the meaning of life?", &history)
        .await;

    assert!(success);
    assert_eq!(reply, "Most people say 42.");
    assert_eq!(llm.call_count(), 2);

    // The chat call carried the window and the goal
    let chat = &llm.prompts()[1];
    assert!(chat.contains("user: hi"));
    assert!(chat.contains("assistant: Hello! How can I help?"));
    assert!(chat.ends_with("user: What's the meaning of life?"));
    Ok(())
}

#[tokio::test]
async fn test_silent_conversation_is_terminal() -> Result<()> {
    let orchestrator = Orchestrator::builder()
        .with_llm(Arc::new(MockLlm::new(vec!["[]"])))
        .with_summary_llm(None)
        .with_tools(Arc::new(MockToolRegistry::new()))
        .build()?;

    let (success, reply) = orchestrator
        .process("tell me something", &ConversationWindow::default())
        .await;

    assert!(!success);
    assert!(reply.contains("no plan and no conversational reply"));
    Ok(())
}

#[tokio::test]
async fn test_dead_generators_still_report_steps() -> Result<()> {
    // 1. Planner gives one step; later calls (replan, summaries) get nothing useful
    let tools = Arc::new(MockToolRegistry::new());
    tools.add(Arc::new(RecordingTool::new(
        "write_file",
        ToolOutput::error("permission denied"),
    )));
    let orchestrator = Orchestrator::builder()
        .with_llm(Arc::new(MockLlm::new(vec![
            r#"[{"tool_name": "write_file", "args": ["notes.txt"]}]"#,
        ])))
        .with_summary_llm(Some(Arc::new(MockLlm::failing())))
        .with_tools(tools)
        .build()?;

    // 2. Process
    let (success, reply) = orchestrator
        .process("save my notes", &ConversationWindow::default())
        .await;

    // 3. The deterministic summary survives
    assert!(!success);
    assert!(reply.starts_with("permission denied"));
    assert!(reply.contains("Here's a summary of what I did:"));
    assert!(reply.contains("- Ran 'write_file' with arguments ('notes.txt'): Failed (Error: permission denied)"));
    Ok(())
}

#[tokio::test]
async fn test_uncaught_error_is_rephrased() -> Result<()> {
    let orchestrator = Orchestrator::builder()
        .with_llm(Arc::new(MockLlm::failing()))
        .with_tools(Arc::new(OfflineRegistry))
        .build()?;

    let (success, reply) = orchestrator
        .process("Please greet John", &ConversationWindow::default())
        .await;

    assert!(!success);
    assert!(reply.starts_with("Error during orchestration"));
    assert!(reply.contains("registry offline"));
    assert!(reply.ends_with("No actions were planned or taken."));
    Ok(())
}

fn staging_registry(proposal: &StagedProposal) -> Arc<MockToolRegistry> {
    let tools = Arc::new(MockToolRegistry::new());
    tools.add(Arc::new(RecordingTool::new(
        "propose_improvement",
        ToolOutput::staged("Proposal staged", proposal.clone()),
    )));
    tools
}

#[tokio::test]
async fn test_rejected_proposal_fails_outcome() -> Result<()> {
    let proposal = StagedProposal {
        target_tool: "greet_user".into(),
        details: json!({"change": "be more polite"}),
    };
    let modifier = Arc::new(MockSelfModifier::rejecting());
    let orchestrator = Orchestrator::builder()
        .with_llm(Arc::new(MockLlm::new(vec![r#"[{"tool_name": "propose_improvement"}]"#])))
        .with_summary_llm(None)
        .with_tools(staging_registry(&proposal))
        .with_self_modifier(modifier.clone())
        .build()?;

    let (success, reply) = orchestrator
        .process("improve your greeting", &ConversationWindow::default())
        .await;

    assert!(!success);
    assert!(reply.contains("was not applied"));
    assert_eq!(modifier.proposals(), vec![proposal]);
    Ok(())
}

#[tokio::test]
async fn test_accepted_proposal_succeeds() -> Result<()> {
    let proposal = StagedProposal {
        target_tool: "greet_user".into(),
        details: json!({"change": "be more polite"}),
    };
    let orchestrator = Orchestrator::builder()
        .with_llm(Arc::new(MockLlm::new(vec![r#"[{"tool_name": "propose_improvement"}]"#])))
        .with_summary_llm(None)
        .with_tools(staging_registry(&proposal))
        .with_self_modifier(Arc::new(MockSelfModifier::accepting()))
        .build()?;

    let (success, reply) = orchestrator
        .process("improve your greeting", &ConversationWindow::default())
        .await;

    assert!(success);
    assert!(reply.contains("Applied staged modification to 'greet_user'"));
    Ok(())
}

#[tokio::test]
async fn test_proposal_without_modifier_fails() -> Result<()> {
    let proposal = StagedProposal {
        target_tool: "greet_user".into(),
        details: json!({}),
    };
    let orchestrator = Orchestrator::builder()
        .with_llm(Arc::new(MockLlm::new(vec![r#"[{"tool_name": "propose_improvement"}]"#])))
        .with_summary_llm(None)
        .with_tools(staging_registry(&proposal))
        .build()?;

    let (success, reply) = orchestrator
        .process("improve your greeting", &ConversationWindow::default())
        .await;

    assert!(!success);
    assert!(reply.contains("self-modification collaborator unavailable"));
    Ok(())
}

#[tokio::test]
async fn test_facts_reach_planner() -> Result<()> {
    let llm = Arc::new(MockLlm::new(vec![GREET_PLAN]));
    let store = Arc::new(MockFactStore::new(vec![Fact::new(
        "John prefers formal greetings",
        "user_preference",
        "conversation",
    )]));
    let orchestrator = Orchestrator::builder()
        .with_llm(llm.clone())
        .with_summary_llm(None)
        .with_tools(Arc::new(MockToolRegistry::with_names(&["greet_user"])))
        .with_fact_store(store.clone())
        .build()?;

    orchestrator
        .process("Please greet John", &ConversationWindow::default())
        .await;

    assert_eq!(store.queries()[0], vec!["please", "greet", "john"]);
    assert!(llm.prompts()[0].contains("John prefers formal greetings"));
    Ok(())
}

#[tokio::test]
async fn test_executor_receives_request_context() -> Result<()> {
    let executor = Arc::new(MockExecutor::succeeding());
    let store = Arc::new(MockFactStore::new(vec![Fact::new(
        "John prefers formal greetings",
        "user_preference",
        "conversation",
    )]));
    let orchestrator = Orchestrator::builder()
        .with_llm(Arc::new(MockLlm::new(vec![GREET_PLAN])))
        .with_summary_llm(None)
        .with_tools(Arc::new(MockToolRegistry::with_names(&["greet_user"])))
        .with_executor(executor.clone())
        .with_fact_store(store)
        .build()?;

    let mut history = ConversationWindow::default();
    history.record_exchange("who is John?", "Your colleague.");

    let (success, _) = orchestrator.process("Please greet John", &history).await;

    assert!(success);
    let contexts = executor.contexts();
    assert_eq!(contexts.len(), 1);
    assert!(contexts[0].contains("user: who is John?"));
    assert!(contexts[0].contains("John prefers formal greetings"));
    Ok(())
}

#[tokio::test]
async fn test_session_carries_window_between_goals() -> Result<()> {
    let llm = Arc::new(MockLlm::new(vec![
        GREET_PLAN,
        "Said hello to John.",
        r#"[{"tool_name": "greet_user", "args": ["Mary"]}]"#,
        "Said hello to Mary.",
    ]));
    let orchestrator = Orchestrator::builder()
        .with_llm(llm.clone())
        .with_tools(Arc::new(MockToolRegistry::with_names(&["greet_user"])))
        .build()?;
    let mut session = Session::new(Arc::new(orchestrator), 1);

    let (ok, first) = session.send("Please greet John").await;
    assert!(ok);
    assert_eq!(first, "Said hello to John.");
    assert_eq!(session.history().len(), 2);

    let (ok, _) = session.send("Now greet Mary").await;
    assert!(ok);

    // Second planning prompt saw the first exchange
    assert!(llm.prompts()[2].contains("Said hello to John."));

    // Window of one exchange keeps only the latest
    let turns = session.history().to_vec();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].content, "Now greet Mary");

    session.clear_history();
    assert!(session.history().is_empty());
    Ok(())
}
