//! Metrics implementation using Prometheus.
//!
//! The helpers are no-ops until a recorder is installed, so library code
//! can call them unconditionally.

use goal_agent_core::{Error, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize Prometheus recorder and return the handle.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| Error::governance(format!("Failed to install Prometheus recorder: {}", e)))?;

    tracing::info!("Prometheus metrics recorder initialized");
    Ok(handle)
}

/// One plan generation call. `purpose` is "plan" or "replan"; `outcome` is
/// "accepted" or "rejected".
pub fn track_plan_attempt(purpose: &str, outcome: &str) {
    metrics::counter!(
        "goal_agent_plan_attempts_total",
        "purpose" => purpose.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Result of an escalation to hierarchical planning.
pub fn track_escalation(result: &str) {
    metrics::counter!("goal_agent_escalations_total", "result" => result.to_string())
        .increment(1);
}

/// Helper to track processed goals (count, latency) by exit path.
pub fn track_request(path: &str, success: bool, latency_sec: f64) {
    metrics::counter!(
        "goal_agent_requests_total",
        "path" => path.to_string(),
        "success" => success.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "goal_agent_request_duration_seconds",
        "path" => path.to_string()
    )
    .record(latency_sec);
}

/// A model call that failed and is about to be retried.
pub fn track_transport_retry(provider: &str) {
    metrics::counter!("goal_agent_transport_retries_total", "provider" => provider.to_string())
        .increment(1);
}

/// Helper to track token usage.
pub fn track_tokens(model: &str, prompt: u64, completion: u64) {
    metrics::counter!("goal_agent_token_usage_total", "model" => model.to_string(), "type" => "prompt").increment(prompt);
    metrics::counter!("goal_agent_token_usage_total", "model" => model.to_string(), "type" => "completion").increment(completion);
}
