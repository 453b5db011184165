#![deny(unused)]
//! Storage collaborators for the goal agent.
//!
//! This crate provides:
//! - An in-memory fact store with keyword and category selection
//! - An in-memory task tracker for delegated project plans

pub mod facts;
pub mod tasks;

pub use facts::{FactSelection, InMemoryFactStore, MAX_CONTEXT_FACTS};
pub use tasks::{InMemoryTaskTracker, TaskRecord};
pub use goal_agent_core::traits::TaskStatus;
