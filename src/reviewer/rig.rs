//! rig-core integration for LLM-backed review.
//!
//! Uses rig-core's provider clients and Agent abstraction for
//! multi-provider support. Currently supports Anthropic, OpenAI, Gemini,
//! and any OpenAI-compatible API.

use std::time::Duration;

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers;

use crate::config::ProviderConfig;

use super::{ProviderName, Reviewer, ReviewerError};

/// Maximum tokens per LLM completion response.
///
/// Set high enough to accommodate thinking models (e.g. Gemini 2.5 Pro)
/// that consume part of the budget for internal reasoning tokens.
const MAX_TOKENS: u64 = 65536;

/// Maximum number of retry attempts for transient API errors.
pub const MAX_RETRIES: u32 = 3;

/// Initial backoff delay between retries.
pub const INITIAL_BACKOFF: Duration = Duration::from_secs(10);

/// Maximum backoff delay between retries.
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

const SYSTEM_PROMPT: &str = "\
You are an experienced software engineer reviewing a pull request. You are \
given the changed files as unified diff hunks with line numbers. Review the \
changes for correctness, clarity, and maintainability.

Respond in markdown. For each issue, name the file and line numbers and \
explain the problem concretely. If a file looks fine, do not comment on it. \
If the change-set as a whole looks good, say so briefly. Do not restate the \
diff and do not pad the review with praise.";

/// Build an agent from a rig-core client and prompt it.
///
/// Always sets `max_tokens` — all rig-core providers support it and without
/// it some (e.g. Gemini) default to a low limit that truncates responses.
macro_rules! prompt_agent {
    ($client:expr, $model:expr, $user:expr, $label:expr) => {{
        let agent = $client
            .agent($model)
            .preamble(SYSTEM_PROMPT)
            .temperature(0.0)
            .max_tokens(MAX_TOKENS)
            .build();
        agent
            .prompt($user)
            .await
            .map_err(|e| ReviewerError::Api(format!("{} API error: {e}", $label)))
    }};
}

/// Create a rig-core client using the `Client::new(api_key)` convention.
macro_rules! new_client {
    ($provider_mod:path, $api_key:expr, $label:expr) => {{
        <$provider_mod>::new($api_key)
            .map_err(|e| ReviewerError::Api(format!("failed to create {} client: {e}", $label)))
    }};
}

/// rig-core based reviewer.
///
/// Wraps rig-core's multi-provider client system. The provider name
/// in config selects which rig-core provider to use.
#[derive(Debug)]
pub struct RigReviewer {
    config: ProviderConfig,
}

impl RigReviewer {
    pub fn new(config: ProviderConfig) -> Result<Self, ReviewerError> {
        if config.api_key.is_none() {
            return Err(ReviewerError::NotConfigured(format!(
                "no API key found for provider '{}'. Set {} or {}.",
                config.name,
                crate::constants::ENV_API_KEY,
                config.name.api_key_env_var(),
            )));
        }
        Ok(Self { config })
    }

    fn api_key(&self) -> Result<&str, ReviewerError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| ReviewerError::NotConfigured("missing API key".to_string()))
    }

    /// Build an OpenAI-style client, optionally with a custom base URL.
    fn build_openai_client(
        &self,
        api_key: &str,
    ) -> Result<providers::openai::CompletionsClient, ReviewerError> {
        let mut builder = providers::openai::CompletionsClient::builder().api_key(api_key);
        if let Some(ref base_url) = self.config.base_url {
            builder = builder.base_url(base_url);
        }
        builder
            .build()
            .map_err(|e| ReviewerError::Api(format!("failed to create OpenAI client: {e}")))
    }

    /// Require `base_url` for OpenAI-compatible providers.
    fn require_base_url(&self) -> Result<&str, ReviewerError> {
        self.config.base_url.as_deref().ok_or_else(|| {
            ReviewerError::NotConfigured(
                "openai-compatible provider requires base_url to be set".to_string(),
            )
        })
    }

    /// Make a single completion call through rig-core.
    async fn call_rig(&self, user_prompt: &str) -> Result<String, ReviewerError> {
        let api_key = self.api_key()?;
        let model = self.config.model.as_str();

        match self.config.name {
            ProviderName::Anthropic => {
                let client: providers::anthropic::Client = providers::anthropic::Client::builder()
                    .api_key(api_key)
                    .build()
                    .map_err(|e| {
                        ReviewerError::Api(format!("failed to create Anthropic client: {e}"))
                    })?;
                prompt_agent!(client, model, user_prompt, "Anthropic")
            }
            ProviderName::OpenAI => {
                let client = self.build_openai_client(api_key)?;
                prompt_agent!(client, model, user_prompt, "OpenAI")
            }
            ProviderName::Gemini => {
                let client = new_client!(providers::gemini::Client, api_key, "Gemini")?;
                prompt_agent!(client, model, user_prompt, "Gemini")
            }
            ProviderName::OpenAICompatible => {
                let base_url = self.require_base_url()?;
                let client: providers::openai::CompletionsClient =
                    providers::openai::CompletionsClient::builder()
                        .api_key(api_key)
                        .base_url(base_url)
                        .build()
                        .map_err(|e| {
                            ReviewerError::Api(format!(
                                "failed to create OpenAI-compatible client: {e}"
                            ))
                        })?;
                prompt_agent!(client, model, user_prompt, "OpenAI-compatible")
            }
        }
    }
}

#[async_trait]
impl Reviewer for RigReviewer {
    async fn review(&self, change_set: &str) -> Result<String, ReviewerError> {
        let mut attempt: u32 = 0;
        loop {
            match self.call_rig(change_set).await {
                Ok(text) => return Ok(text),
                Err(err) if attempt < MAX_RETRIES && is_retryable(&err) => {
                    let delay = retry_backoff(attempt);
                    eprintln!(
                        "Warning: {} (attempt {}/{}), retrying in {}s",
                        classify_error(&err).unwrap_or("Transient API error"),
                        attempt + 1,
                        MAX_RETRIES,
                        delay.as_secs()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Check whether a reviewer error is transient and worth retrying.
///
/// Matches HTTP status codes commonly used for rate limiting and
/// temporary unavailability: 429 (Too Many Requests), 503 (Service
/// Unavailable), 529 (Overloaded), and connection/timeout errors.
pub fn is_retryable(err: &ReviewerError) -> bool {
    classify_error(err).is_some()
}

/// Classifies a reviewer error into a short, user-friendly message.
///
/// Returns `Some(message)` for transient/retryable errors, `None` otherwise.
pub fn classify_error(err: &ReviewerError) -> Option<&'static str> {
    match err {
        ReviewerError::Api(msg) => {
            let msg_lower = msg.to_lowercase();
            if msg_lower.contains("429")
                || msg_lower.contains("rate limit")
                || msg_lower.contains("too many requests")
            {
                Some("Rate limited by API")
            } else if msg_lower.contains("503")
                || msg_lower.contains("service unavailable")
                || msg_lower.contains("high demand")
            {
                Some("High model load")
            } else if msg_lower.contains("529") || msg_lower.contains("overloaded") {
                Some("API overloaded")
            } else if msg_lower.contains("502") {
                Some("API gateway error")
            } else if msg_lower.contains("timeout") || msg_lower.contains("timed out") {
                Some("Request timed out")
            } else if msg_lower.contains("connection") {
                Some("Connection error")
            } else {
                None
            }
        }
        ReviewerError::NotConfigured(_) => None,
    }
}

/// Compute the backoff duration for a retry attempt using exponential backoff.
pub fn retry_backoff(attempt: u32) -> Duration {
    let backoff = INITIAL_BACKOFF.saturating_mul(2u32.saturating_pow(attempt));
    backoff.min(MAX_BACKOFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_429_rate_limit() {
        let err = ReviewerError::Api("Anthropic API error: 429 Too Many Requests".to_string());
        assert!(is_retryable(&err));
    }

    #[test]
    fn retryable_overloaded_message() {
        let err = ReviewerError::Api("upstream is overloaded, try later".to_string());
        assert!(is_retryable(&err));
    }

    #[test]
    fn not_retryable_auth_error() {
        let err = ReviewerError::Api("401 Unauthorized: invalid api key".to_string());
        assert!(!is_retryable(&err));
    }

    #[test]
    fn not_retryable_not_configured() {
        let err = ReviewerError::NotConfigured("missing API key".to_string());
        assert!(!is_retryable(&err));
    }

    #[test]
    fn backoff_is_exponential_and_capped() {
        assert_eq!(retry_backoff(0), INITIAL_BACKOFF);
        assert_eq!(retry_backoff(1), INITIAL_BACKOFF * 2);
        assert_eq!(retry_backoff(10), MAX_BACKOFF);
    }

    #[test]
    fn missing_api_key_rejected_at_construction() {
        let config = ProviderConfig {
            api_key: None,
            ..ProviderConfig::default()
        };
        let err = RigReviewer::new(config).unwrap_err();
        assert!(matches!(err, ReviewerError::NotConfigured(_)));
    }
}
