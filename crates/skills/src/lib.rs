#![deny(unused)]
//! Capabilities for the goal agent.
//!
//! This crate provides:
//! - Tool registry for managing available tools
//! - Built-in tools (echo, greet_user, calculator, execute_project_plan, ...)

pub mod builtin;
pub mod registry;

pub use builtin::*;
pub use registry::{create_default_registry, create_tracked_registry, DefaultToolRegistry};
