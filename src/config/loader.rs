//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables
//! 3. `.recheck.toml` in the working directory
//! 4. `~/.config/recheck/config.toml` (global defaults)
//! 5. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants;
use crate::env::Env;
use crate::reviewer::ProviderName;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("missing required setting: {0}")]
    Missing(&'static str),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub review: ReviewConfig,
    pub host: HostConfig,
    pub provider: ProviderConfig,
}

/// Review-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Review only files touched by commits pushed since the last review.
    pub incremental: bool,
    /// Exit without calling the model when every commit is already reviewed.
    pub skip_if_reviewed: bool,
    pub max_files: usize,
    pub max_file_chars: usize,
    pub max_total_chars: usize,
    pub context_lines: usize,
    pub batch_width: usize,
    /// Folder prefixes excluded from review (e.g. `vendor`, `dist`).
    pub skip_folders: Vec<String>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            incremental: false,
            skip_if_reviewed: false,
            max_files: constants::DEFAULT_MAX_FILES,
            max_file_chars: constants::DEFAULT_MAX_FILE_CHARS,
            max_total_chars: constants::DEFAULT_MAX_TOTAL_CHARS,
            context_lines: constants::DEFAULT_CONTEXT_LINES,
            batch_width: constants::DEFAULT_BATCH_WIDTH,
            skip_folders: Vec::new(),
        }
    }
}

/// Azure DevOps connection configuration.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Organization base URL, e.g. `https://dev.azure.com/contoso`.
    pub organization_url: Option<String>,
    pub project: Option<String>,
    pub repository: Option<String>,
    /// Personal access token with Code (Read) and PR thread scopes.
    pub token: Option<String>,
}

impl std::fmt::Debug for HostConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostConfig")
            .field("organization_url", &self.organization_url)
            .field("project", &self.project)
            .field("repository", &self.repository)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HostConfig {
    pub fn organization_url(&self) -> Result<&str, ConfigError> {
        self.organization_url
            .as_deref()
            .ok_or(ConfigError::Missing("host.organization_url"))
    }

    pub fn project(&self) -> Result<&str, ConfigError> {
        self.project.as_deref().ok_or(ConfigError::Missing("host.project"))
    }

    pub fn repository(&self) -> Result<&str, ConfigError> {
        self.repository
            .as_deref()
            .ok_or(ConfigError::Missing("host.repository"))
    }

    pub fn token(&self) -> Result<&str, ConfigError> {
        self.token.as_deref().ok_or(ConfigError::Missing("host.token"))
    }
}

/// LLM provider configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub name: ProviderName,
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: ProviderName::Anthropic,
            model: "claude-sonnet-4-20250514".to_string(),
            base_url: None,
            api_key: None,
        }
    }
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// Reads from global config, then local config, then applies
    /// environment variable overrides.
    pub fn load(local_root: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Layer 4: global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                config.merge(global);
            }
        }

        // Layer 3: local config
        if let Some(root) = local_root {
            let local_path = root.join(constants::CONFIG_FILENAME);
            if local_path.exists() {
                let local = Self::load_file(&local_path)?;
                config.merge(local);
            }
        }

        // Layer 2: environment variables
        config.apply_env_vars(env);

        Ok(config)
    }

    /// Load a config from a specific file.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(constants::CONFIG_DIR).join("config.toml"))
    }

    /// Merge another config into this one (other takes precedence for non-default values).
    fn merge(&mut self, other: Config) {
        // Review settings
        let default_review = ReviewConfig::default();
        if other.review.incremental {
            self.review.incremental = true;
        }
        if other.review.skip_if_reviewed {
            self.review.skip_if_reviewed = true;
        }
        if other.review.max_files != default_review.max_files {
            self.review.max_files = other.review.max_files;
        }
        if other.review.max_file_chars != default_review.max_file_chars {
            self.review.max_file_chars = other.review.max_file_chars;
        }
        if other.review.max_total_chars != default_review.max_total_chars {
            self.review.max_total_chars = other.review.max_total_chars;
        }
        if other.review.context_lines != default_review.context_lines {
            self.review.context_lines = other.review.context_lines;
        }
        if other.review.batch_width != default_review.batch_width {
            self.review.batch_width = other.review.batch_width;
        }
        if !other.review.skip_folders.is_empty() {
            self.review.skip_folders = other.review.skip_folders;
        }

        // Host settings
        if other.host.organization_url.is_some() {
            self.host.organization_url = other.host.organization_url;
        }
        if other.host.project.is_some() {
            self.host.project = other.host.project;
        }
        if other.host.repository.is_some() {
            self.host.repository = other.host.repository;
        }
        if other.host.token.is_some() {
            self.host.token = other.host.token;
        }

        // Provider settings
        let default_provider = ProviderConfig::default();
        if other.provider.name != default_provider.name {
            self.provider.name = other.provider.name;
        }
        if other.provider.model != default_provider.model {
            self.provider.model = other.provider.model;
        }
        if other.provider.base_url.is_some() {
            self.provider.base_url = other.provider.base_url;
        }
        if other.provider.api_key.is_some() {
            self.provider.api_key = other.provider.api_key;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Some(val) = env.var(constants::ENV_PROVIDER) {
            match val.parse::<ProviderName>() {
                Ok(name) => self.provider.name = name,
                Err(_) => {
                    eprintln!(
                        "Warning: ignoring invalid {} value: {val}",
                        constants::ENV_PROVIDER
                    );
                }
            }
        }
        if let Some(val) = env.var(constants::ENV_MODEL) {
            self.provider.model = val;
        }
        if let Some(val) = env.var(constants::ENV_BASE_URL) {
            self.provider.base_url = Some(val);
        }

        // Provider-specific API key resolution
        let api_key = env.first_of(&[
            constants::ENV_API_KEY,
            self.provider.name.api_key_env_var(),
        ]);
        if api_key.is_some() {
            self.provider.api_key = api_key;
        }

        if let Some(val) = env.var(constants::ENV_ORG_URL) {
            self.host.organization_url = Some(val);
        }
        if let Some(val) = env.var(constants::ENV_PROJECT) {
            self.host.project = Some(val);
        }
        if let Some(val) = env.var(constants::ENV_REPOSITORY) {
            self.host.repository = Some(val);
        }
        let token = env.first_of(&[constants::ENV_HOST_TOKEN, constants::ENV_HOST_TOKEN_FALLBACK]);
        if token.is_some() {
            self.host.token = token;
        }
    }
}
