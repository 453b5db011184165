#![deny(unused)]
//! Text-generation backend for the goal agent.
//!
//! This crate provides:
//! - Rig LLM client adapter
//! - Transport retry with exponential backoff, jitter and per-call timeout

pub mod retry;
pub mod rig_client;

pub use retry::{RetryPolicy, RetryingLlmClient};
pub use rig_client::{export_api_key, RigConfig, RigLlmClient, RigProvider};

use goal_agent_core::config::{ModelConfig, RetryConfig};
use goal_agent_core::Result;

/// Build the retrying Rig client described by configuration.
pub fn create_client_from_config(
    model: &ModelConfig,
    retry: &RetryConfig,
) -> Result<RetryingLlmClient<RigLlmClient>> {
    export_api_key(model)?;
    let config = RigConfig::from_model_config(model)?;
    let label = config.provider.as_str();
    Ok(RetryingLlmClient::new(RigLlmClient::new(config), RetryPolicy::from(retry)).with_label(label))
}
