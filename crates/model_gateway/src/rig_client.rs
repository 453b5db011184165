//! Text generation through Rig provider agents.

use async_trait::async_trait;
use secrecy::ExposeSecret;

use goal_agent_core::{
    config::ModelConfig,
    traits::{ChatMessage, LlmClient, LlmResponse, LlmUsage},
    Error, Result,
};
use goal_agent_governance::metrics::track_tokens;

use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;

/// Backends reachable through Rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigProvider {
    OpenAI,
    Anthropic,
}

impl RigProvider {
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(Error::model_provider(format!(
                "Unsupported provider '{}'; expected openai or anthropic",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
        }
    }

    /// Variable Rig's `from_env` constructors read.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    fn key_present(&self) -> bool {
        std::env::var(self.api_key_var()).is_ok()
    }
}

/// Resolved model selection.
#[derive(Debug, Clone)]
pub struct RigConfig {
    pub provider: RigProvider,
    pub model: String,
    /// Preamble given to every agent built from this config.
    pub system_prompt: Option<String>,
}

impl RigConfig {
    pub fn from_model_config(config: &ModelConfig) -> Result<Self> {
        Ok(Self {
            provider: RigProvider::parse(&config.provider)?,
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
        })
    }
}

// Both provider modules expose the same agent builder surface.
macro_rules! prompt_agent {
    ($module:ident, $label:literal, $config:expr, $prompt:expr) => {{
        let client = rig::providers::$module::Client::from_env();
        let mut builder = client.agent(&$config.model);
        if let Some(preamble) = $config.system_prompt.as_deref() {
            builder = builder.preamble(preamble);
        }
        builder
            .build()
            .prompt($prompt)
            .await
            .map_err(|e| Error::model_provider(format!(concat!($label, " error: {}"), e)))
    }};
}

/// [`LlmClient`] over a single Rig provider.
pub struct RigLlmClient {
    config: RigConfig,
}

impl RigLlmClient {
    pub fn new(config: RigConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let provider = self.config.provider;
        // from_env panics on a missing key
        if !provider.key_present() {
            return Err(Error::model_provider(format!(
                "{} not set",
                provider.api_key_var()
            )));
        }

        match provider {
            RigProvider::OpenAI => prompt_agent!(openai, "OpenAI", self.config, prompt),
            RigProvider::Anthropic => prompt_agent!(anthropic, "Anthropic", self.config, prompt),
        }
    }
}

/// Flatten chat turns into one role-labelled transcript.
fn transcript(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|msg| {
            let label = match msg.role.as_str() {
                "system" => "System",
                "user" => "User",
                "assistant" => "Assistant",
                other => other,
            };
            format!("{}: {}\n\n", label, msg.content)
        })
        .collect()
}

// Rig's prompt API reports no usage; four characters per token is close enough.
fn estimate_usage(prompt: &str, completion: &str) -> LlmUsage {
    let prompt_tokens = (prompt.len() / 4) as u64;
    let completion_tokens = (completion.len() / 4) as u64;
    LlmUsage {
        prompt_tokens,
        completion_tokens,
        total_tokens: prompt_tokens + completion_tokens,
    }
}

#[async_trait]
impl LlmClient for RigLlmClient {
    async fn complete(&self, prompt: &str) -> Result<LlmResponse> {
        tracing::debug!(
            provider = self.config.provider.as_str(),
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Requesting completion"
        );

        let content = self.generate(prompt).await?;
        let usage = estimate_usage(prompt, &content);
        track_tokens(&self.config.model, usage.prompt_tokens, usage.completion_tokens);

        Ok(LlmResponse {
            content,
            finish_reason: "stop".to_string(),
            usage,
        })
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<LlmResponse> {
        self.complete(&transcript(messages)).await
    }
}

/// Export `model.api_key` under the provider's variable unless the
/// environment already carries one.
pub fn export_api_key(config: &ModelConfig) -> Result<()> {
    let provider = RigProvider::parse(&config.provider)?;
    if provider.key_present() {
        return Ok(());
    }

    let key = config.api_key.as_ref().ok_or_else(|| {
        Error::model_provider(format!(
            "No API key for {}. Set model.api_key or {}",
            provider.as_str(),
            provider.api_key_var()
        ))
    })?;
    std::env::set_var(provider.api_key_var(), key.expose_secret());
    Ok(())
}
