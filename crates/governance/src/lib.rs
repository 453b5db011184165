#![deny(unused)]
//! Observability for the goal agent.
//!
//! This crate provides:
//! - Log and trace subscriber setup, with optional OTLP export
//! - Prometheus counters for planning, escalation and request outcomes

pub mod metrics;
pub mod tracing_layer;

pub use metrics::{
    setup_metrics_recorder, track_escalation, track_plan_attempt, track_request, track_tokens,
    track_transport_retry,
};
pub use tracing_layer::configure_tracing;
