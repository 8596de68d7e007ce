//! Backoff around an [`LLMProvider`] for transient failures.
//!
//! Rate limits, 5xx replies and dropped connections are common enough on
//! long generations that one failed call should not cost a quiz question.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use quizsolver_protocols::{Generation, GenerationRequest, LLMProvider, ProviderError};

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts after the first one.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Wait before retry `n` (zero-based): `base * multiplier^n`, capped.
    pub fn delay_for_attempt(&self, n: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(n.min(i32::MAX as u32) as i32);
        let delay = self.base_delay.as_secs_f64() * factor;
        if !delay.is_finite() || delay >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        Duration::from_secs_f64(delay.max(0.0))
    }
}

pub struct RetryProvider {
    inner: Arc<dyn LLMProvider>,
    config: RetryConfig,
}

impl RetryProvider {
    pub fn new(inner: Arc<dyn LLMProvider>, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    pub fn inner(&self) -> &Arc<dyn LLMProvider> {
        &self.inner
    }
}

#[async_trait]
impl LLMProvider for RetryProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Generation, ProviderError> {
        let attempts = self.config.max_retries + 1;
        let mut retry = 0;
        loop {
            let err = match self.inner.generate(request.clone()).await {
                Ok(generation) => return Ok(generation),
                Err(err) => err,
            };
            if !err.is_transient() || retry == self.config.max_retries {
                return Err(err);
            }

            let delay = self.config.delay_for_attempt(retry);
            retry += 1;
            warn!(
                provider = self.inner.name(),
                attempt = retry,
                attempts,
                ?delay,
                "Transient LLM error: {}",
                err
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
