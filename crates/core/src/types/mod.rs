//! Core type definitions for the goal agent.
//!
//! Everything here lives for one orchestration request, except the
//! conversation window which a session keeps across requests.

pub mod conversation;
pub mod fact;
pub mod outcome;
pub mod plan;
pub mod project;
pub mod tool;

pub use conversation::*;
pub use fact::*;
pub use outcome::*;
pub use plan::*;
pub use project::*;
pub use tool::*;
