//! Transport retry for text-generation calls.
//!
//! Repeats the identical call on transient failures. Content problems
//! (bad plans, empty answers) are the planner's business and pass through.

use async_trait::async_trait;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

use goal_agent_core::{
    config::RetryConfig,
    traits::{ChatMessage, LlmClient, LlmResponse},
    Error, Result,
};
use goal_agent_governance::metrics::track_transport_retry;

/// Backoff schedule and per-call bound.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub max_retries: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: bool,
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        Self {
            max_retries: cfg.max_retries,
            base_delay: Duration::from_millis(cfg.base_delay_ms),
            max_delay: Duration::from_millis(cfg.max_delay_ms),
            jitter: cfg.jitter,
            call_timeout: Duration::from_secs(cfg.call_timeout_secs),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry `n` (0-based): `min(max, base * 2^n)` plus up to
    /// half a base delay of jitter.
    pub fn delay_for(&self, n: usize) -> Duration {
        let base_ms = self.base_delay.as_millis() as u64;
        let factor = 2u64.saturating_pow(n.min(u32::MAX as usize) as u32);
        let backoff_ms = base_ms
            .saturating_mul(factor)
            .min(self.max_delay.as_millis() as u64);

        let jitter_ms = if self.jitter {
            rand::thread_rng().gen_range(0..=base_ms / 2)
        } else {
            0
        };

        Duration::from_millis(backoff_ms + jitter_ms)
    }
}

/// Wraps an [`LlmClient`] with retries and a per-call timeout.
pub struct RetryingLlmClient<C> {
    inner: C,
    policy: RetryPolicy,
    label: &'static str,
}

impl<C: LlmClient> RetryingLlmClient<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            label: "default",
        }
    }

    /// Provider label attached to retry metrics.
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    async fn with_retry<F, Fut>(&self, call: F) -> Result<LlmResponse>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<LlmResponse>>,
    {
        let attempts = self.policy.max_retries + 1;
        let mut last_error = String::new();

        for attempt in 0..attempts {
            match tokio::time::timeout(self.policy.call_timeout, call()).await {
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(e)) if !e.is_transient() => return Err(e),
                Ok(Err(e)) => last_error = e.to_string(),
                Err(_) => {
                    last_error = Error::Timeout(format!(
                        "model call exceeded {}s",
                        self.policy.call_timeout.as_secs()
                    ))
                    .to_string()
                }
            }

            if attempt + 1 < attempts {
                let delay = self.policy.delay_for(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %last_error,
                    "Model call failed; retrying"
                );
                track_transport_retry(self.label);
                tokio::time::sleep(delay).await;
            }
        }

        Err(Error::RetriesExhausted {
            attempts,
            last_error,
        })
    }
}

#[async_trait]
impl<C: LlmClient> LlmClient for RetryingLlmClient<C> {
    async fn complete(&self, prompt: &str) -> Result<LlmResponse> {
        self.with_retry(|| self.inner.complete(prompt)).await
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<LlmResponse> {
        self.with_retry(|| self.inner.chat(messages)).await
    }
}
