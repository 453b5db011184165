#![deny(unused)]
//! Planning and orchestration for the goal agent.
//!
//! This crate turns a free-text goal into a validated plan, escalates to
//! hierarchical decomposition when flat planning comes up empty, dispatches
//! the plan for execution, and synthesizes the reply.

pub mod builder;
pub mod context;
pub mod executor;
pub mod hierarchical;
pub mod normalize;
pub mod orchestrator;
pub mod parser;
pub mod planning;
pub mod prompts;
pub mod session;
pub mod synthesis;

pub use builder::OrchestratorBuilder;
pub use context::{PlanningContext, ProjectContext};
pub use executor::{ExecutorConfig, SequentialExecutor};
pub use hierarchical::HierarchicalPlanner;
pub use normalize::normalize;
pub use orchestrator::{Orchestrator, OrchestratorConfig};
pub use parser::{parse_list, parse_plan};
pub use planning::PlanGenerator;
pub use session::Session;
pub use synthesis::{
    primary_or_else, technical_summary, ResponseSynthesizer, CLARIFICATION_TOOL, NO_ACTIONS,
    SUCCESS_PREAMBLE,
};
