#![deny(unused)]
//! Goal Agent - planning and orchestration REPL.
//!
//! Reads goals from stdin, one per line, and prints the agent's replies.
//! `/metrics` prints the Prometheus exposition; `/quit` or end of input exits.

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use goal_agent_controller::{
    ExecutorConfig, HierarchicalPlanner, Orchestrator, OrchestratorConfig, Session,
};
use goal_agent_core::config::AppConfig;
use goal_agent_core::traits::LlmClient;
use goal_agent_skills::create_tracked_registry;
use goal_agent_store::{FactSelection, InMemoryFactStore, InMemoryTaskTracker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    // Initialize tracing
    goal_agent_governance::configure_tracing(&config.telemetry)?;
    let metrics_handle = goal_agent_governance::setup_metrics_recorder()?;

    tracing::info!("Starting Goal Agent v{}", env!("CARGO_PKG_VERSION"));

    // =========================================================================
    // Text generation
    // =========================================================================
    let llm: Arc<dyn LlmClient> = Arc::new(goal_agent_model_gateway::create_client_from_config(
        &config.model,
        &config.retry,
    )?);
    tracing::info!(
        provider = %config.model.provider,
        model = %config.model.model,
        "Model client initialized"
    );

    // =========================================================================
    // Capabilities and storage
    // =========================================================================
    let tasks = Arc::new(InMemoryTaskTracker::new());
    let tools = Arc::new(create_tracked_registry(tasks.clone())?);
    tracing::info!(tools_count = tools.len(), "Skills registry initialized");

    let facts = Arc::new(InMemoryFactStore::new(FactSelection::from(&config.store)));
    if let Some(path) = &config.store.facts_path {
        facts.load_from_path(path).await?;
    }

    // =========================================================================
    // Orchestrator
    // =========================================================================
    let orchestrator = Orchestrator::builder()
        .with_config(OrchestratorConfig::from(&config.planner))
        .with_max_corrections(config.planner.max_correction_attempts)
        .with_llm(llm.clone())
        .with_tools(tools)
        .with_executor_config(ExecutorConfig::from(&config.executor))
        .with_decomposer(Arc::new(HierarchicalPlanner::new(llm)))
        .with_task_tracker(tasks.clone())
        .with_fact_store(facts)
        .build()?;

    let mut session = Session::new(Arc::new(orchestrator), config.history.max_turns);

    // =========================================================================
    // REPL
    // =========================================================================
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(b"Goal Agent ready. Type a goal, /metrics, or /quit.\n> ")
        .await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let goal = line.trim();
        match goal {
            "" => {}
            "/quit" => break,
            "/metrics" => {
                stdout.write_all(metrics_handle.render().as_bytes()).await?;
            }
            _ => {
                let (success, reply) = session.send(goal).await;
                tracing::debug!(success, tracked_tasks = tasks.len(), "Reply ready");
                stdout.write_all(format!("{}\n", reply).as_bytes()).await?;
            }
        }
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
    }

    tracing::info!("Goal Agent shutting down");
    Ok(())
}
