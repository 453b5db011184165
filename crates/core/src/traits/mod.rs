//! Collaborator traits consumed by the orchestration core.
//!
//! - `llm`: text generation (LlmClient)
//! - `skills`: capabilities and their registry (Tool, ToolRegistry)
//! - `controller`: execution, decomposition, self-modification, task tracking
//! - `store`: read path into retrieved facts (FactStore)

pub mod controller;
pub mod llm;
pub mod skills;
pub mod store;

pub use controller::*;
pub use llm::*;
pub use skills::*;
pub use store::*;
