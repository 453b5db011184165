use config::{Config, ConfigError, Environment, File};
use secrecy::Secret;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub planner: PlannerConfig,
    pub history: HistoryConfig,
    pub retry: RetryConfig,
    pub model: ModelConfig,
    pub store: StoreConfig,
    pub executor: ExecutorConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PlannerConfig {
    /// Correction attempts after the initial generation call.
    pub max_correction_attempts: usize,
    /// Lowercase phrases that mark a goal as worth hierarchical escalation.
    pub complexity_keywords: Vec<String>,
    /// Capability that receives a delegated project plan.
    pub project_tool_name: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_correction_attempts: 1,
            complexity_keywords: [
                "project",
                "develop",
                "create a game",
                "build an app",
                "design a system",
                "implement a feature",
                "refactor module",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            project_tool_name: "execute_project_plan".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HistoryConfig {
    /// Turns kept; the window holds twice as many messages.
    pub max_turns: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_turns: 5 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: bool,
    pub call_timeout_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 10_000,
            jitter: true,
            call_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ModelConfig {
    /// `openai` or `anthropic`.
    pub provider: String,
    pub model: String,
    pub system_prompt: Option<String>,
    pub api_key: Option<Secret<String>>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            model: "gpt-4o-mini".into(),
            system_prompt: None,
            api_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON array of seed facts.
    pub facts_path: Option<String>,
    pub max_keyword_facts: usize,
    pub max_category_facts: usize,
    pub preferred_categories: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            facts_path: None,
            max_keyword_facts: 5,
            max_category_facts: 2,
            preferred_categories: vec![
                "user_preference".into(),
                "project_context".into(),
                "general_knowledge".into(),
            ],
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExecutorConfig {
    pub stop_on_failure: bool,
    pub max_replans: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            stop_on_failure: true,
            max_replans: 1,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Used when RUST_LOG is unset.
    pub log_filter: String,
    pub json_logs: bool,
    /// OTLP collector; falls back to OTEL_EXPORTER_OTLP_ENDPOINT.
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: "info,goal_agent=debug".into(),
            json_logs: false,
            otlp_endpoint: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("GOAL_AGENT_ENV").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Map APP__PLANNER__MAX_CORRECTION_ATTEMPTS=2 to planner.max_correction_attempts
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
