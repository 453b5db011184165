//! Error types for the goal agent.

use thiserror::Error;

/// Result type alias using the goal agent's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the goal agent.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Planning Errors
    // =========================================================================
    #[error("Plan parse failure: {0}")]
    PlanParse(String),

    #[error("Plan validation failure: {0}")]
    PlanValidation(String),

    #[error("Hierarchical planning error: {0}")]
    HierarchicalPlanning(String),

    // =========================================================================
    // Orchestration Errors
    // =========================================================================
    #[error("Escalation unavailable: {0}")]
    EscalationUnavailable(String),

    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("Conversational fallback failed: {0}")]
    ConversationalFallback(String),

    #[error("Execution step failed: {0}")]
    ExecutionStep(String),

    #[error("Orchestration error: {0}")]
    Orchestration(String),

    // =========================================================================
    // Capability Errors
    // =========================================================================
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Tool execution failed: {0}")]
    ToolExecution(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    // =========================================================================
    // Store Errors
    // =========================================================================
    #[error("Storage error: {0}")]
    Storage(String),

    // =========================================================================
    // Model Gateway Errors
    // =========================================================================
    #[error("Model provider error: {0}")]
    ModelProvider(String),

    #[error("Transport retries exhausted after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: usize, last_error: String },

    // =========================================================================
    // Governance Errors
    // =========================================================================
    #[error("Governance error: {0}")]
    Governance(String),

    // =========================================================================
    // Generic Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a plan parse error.
    pub fn plan_parse(msg: impl Into<String>) -> Self {
        Self::PlanParse(msg.into())
    }

    /// Create a plan validation error.
    pub fn plan_validation(msg: impl Into<String>) -> Self {
        Self::PlanValidation(msg.into())
    }

    /// Create a hierarchical planning error.
    pub fn hierarchical(msg: impl Into<String>) -> Self {
        Self::HierarchicalPlanning(msg.into())
    }

    /// Create an escalation-unavailable error.
    pub fn escalation_unavailable(msg: impl Into<String>) -> Self {
        Self::EscalationUnavailable(msg.into())
    }

    /// Create a dependency-unavailable error.
    pub fn dependency_unavailable(msg: impl Into<String>) -> Self {
        Self::DependencyUnavailable(msg.into())
    }

    /// Create a conversational fallback error.
    pub fn conversational(msg: impl Into<String>) -> Self {
        Self::ConversationalFallback(msg.into())
    }

    /// Create an execution step error.
    pub fn execution_step(msg: impl Into<String>) -> Self {
        Self::ExecutionStep(msg.into())
    }

    /// Create an orchestration error.
    pub fn orchestration(msg: impl Into<String>) -> Self {
        Self::Orchestration(msg.into())
    }

    /// Create a tool not found error.
    pub fn tool_not_found(name: impl Into<String>) -> Self {
        Self::ToolNotFound(name.into())
    }

    /// Create a tool execution error.
    pub fn tool_execution(msg: impl Into<String>) -> Self {
        Self::ToolExecution(msg.into())
    }

    /// Create an invalid arguments error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create a storage error.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a model provider error.
    pub fn model_provider(msg: impl Into<String>) -> Self {
        Self::ModelProvider(msg.into())
    }

    /// Create a governance error.
    pub fn governance(msg: impl Into<String>) -> Self {
        Self::Governance(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error is a transport-level failure worth repeating verbatim.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ModelProvider(_) | Self::Timeout(_))
    }
}
