#![deny(unused)]
//! Core types, traits, and error definitions for the goal agent.
//!
//! This crate provides the building blocks shared by the planner, the
//! orchestration loop, and every collaborator they talk to.

pub mod config;
pub mod error;
pub mod mocks;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::*;
pub use types::*;
