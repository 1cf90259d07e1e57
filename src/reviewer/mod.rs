//! The language-model reviewer seam.
//!
//! The pipeline hands the rendered change-set document to a
//! [`Reviewer`] and posts whatever text comes back. The concrete
//! implementation lives in [`rig`]; tests substitute their own.

pub mod rig;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the reviewer.
#[derive(Error, Debug)]
pub enum ReviewerError {
    #[error("reviewer not configured: {0}")]
    NotConfigured(String),

    #[error("reviewer API error: {0}")]
    Api(String),
}

/// Produces review prose for a rendered change-set document.
#[async_trait]
pub trait Reviewer: Send + Sync {
    async fn review(&self, change_set: &str) -> Result<String, ReviewerError>;
}

/// Supported LLM provider backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    #[default]
    Anthropic,
    #[serde(rename = "openai")]
    OpenAI,
    Gemini,
    /// Any OpenAI-compatible API (e.g. Ollama, local servers).
    #[serde(rename = "openai-compatible")]
    OpenAICompatible,
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderName::Anthropic => write!(f, "anthropic"),
            ProviderName::OpenAI => write!(f, "openai"),
            ProviderName::Gemini => write!(f, "gemini"),
            ProviderName::OpenAICompatible => write!(f, "openai-compatible"),
        }
    }
}

impl std::str::FromStr for ProviderName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anthropic" => Ok(ProviderName::Anthropic),
            "openai" => Ok(ProviderName::OpenAI),
            "gemini" => Ok(ProviderName::Gemini),
            "openai-compatible" => Ok(ProviderName::OpenAICompatible),
            other => Err(format!(
                "unsupported provider: '{other}'. Supported: anthropic, openai, gemini, \
                 openai-compatible"
            )),
        }
    }
}

impl ProviderName {
    /// Provider-specific environment variable holding the API key.
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            ProviderName::Anthropic => "ANTHROPIC_API_KEY",
            ProviderName::OpenAI | ProviderName::OpenAICompatible => "OPENAI_API_KEY",
            ProviderName::Gemini => "GEMINI_API_KEY",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_name_round_trips_through_str() {
        for name in ["anthropic", "openai", "gemini", "openai-compatible"] {
            let parsed: ProviderName = name.parse().unwrap();
            assert_eq!(parsed.to_string(), name);
        }
    }

    #[test]
    fn provider_name_from_str_invalid() {
        let err = "pigeon".parse::<ProviderName>().unwrap_err();
        assert!(err.contains("unsupported provider"));
    }

    #[test]
    fn api_key_env_vars() {
        assert_eq!(ProviderName::Anthropic.api_key_env_var(), "ANTHROPIC_API_KEY");
        assert_eq!(ProviderName::OpenAICompatible.api_key_env_var(), "OPENAI_API_KEY");
    }
}
