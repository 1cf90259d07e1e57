//! Clap argument types and config merging.

use clap::Parser;

use recheck::config::Config;
use recheck::reviewer::ProviderName;

/// Incremental AI review for Azure DevOps pull requests.
#[derive(Parser, Debug)]
#[command(name = "recheck", version = recheck::constants::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Review a pull request and post the result as a PR comment.
    Review(Box<ReviewArgs>),

    /// Show what a review run would do, without calling the model.
    State(StateArgs),

    /// Print version information.
    Version,
}

/// Arguments for the `review` subcommand.
#[derive(Parser, Debug)]
pub struct ReviewArgs {
    /// Pull request id to review.
    #[arg(long)]
    pub pr: u64,

    // --- Host connection ---
    /// Organization base URL, e.g. https://dev.azure.com/contoso.
    #[arg(long)]
    pub org_url: Option<String>,

    /// Azure DevOps project name.
    #[arg(long)]
    pub project: Option<String>,

    /// Repository name within the project.
    #[arg(long)]
    pub repo: Option<String>,

    // --- Mode ---
    /// Review only files touched by commits pushed since the last review.
    #[arg(long, default_value_t = false)]
    pub incremental: bool,

    /// Exit without reviewing when every commit is already covered.
    #[arg(long, default_value_t = false)]
    pub skip_if_reviewed: bool,

    /// Build the change-set and print it, but post nothing.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    // --- Budgets ---
    /// Max files rendered into the change-set document.
    #[arg(long)]
    pub max_files: Option<usize>,

    /// Character budget for the whole change-set document.
    #[arg(long)]
    pub max_total_chars: Option<usize>,

    /// Folder prefix to exclude from review; repeatable.
    #[arg(long = "skip-folder", value_name = "PREFIX")]
    pub skip_folders: Vec<String>,

    // --- Provider ---
    /// LLM provider: anthropic, openai, gemini, openai-compatible.
    #[arg(long)]
    pub provider: Option<ProviderName>,

    /// Model name to use with the provider.
    #[arg(long)]
    pub model: Option<String>,
}

/// Arguments for the `state` subcommand.
#[derive(Parser, Debug)]
pub struct StateArgs {
    /// Pull request id to inspect.
    #[arg(long)]
    pub pr: u64,

    /// Organization base URL, e.g. https://dev.azure.com/contoso.
    #[arg(long)]
    pub org_url: Option<String>,

    /// Azure DevOps project name.
    #[arg(long)]
    pub project: Option<String>,

    /// Repository name within the project.
    #[arg(long)]
    pub repo: Option<String>,

    /// Treat the run as incremental when deciding the mode.
    #[arg(long, default_value_t = false)]
    pub incremental: bool,
}

impl ReviewArgs {
    /// Layer 1: CLI flags take priority over everything else.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(ref url) = self.org_url {
            config.host.organization_url = Some(url.clone());
        }
        if let Some(ref project) = self.project {
            config.host.project = Some(project.clone());
        }
        if let Some(ref repo) = self.repo {
            config.host.repository = Some(repo.clone());
        }
        if self.incremental {
            config.review.incremental = true;
        }
        if self.skip_if_reviewed {
            config.review.skip_if_reviewed = true;
        }
        if let Some(max_files) = self.max_files {
            config.review.max_files = max_files;
        }
        if let Some(max_total_chars) = self.max_total_chars {
            config.review.max_total_chars = max_total_chars;
        }
        if !self.skip_folders.is_empty() {
            config.review.skip_folders = self.skip_folders.clone();
        }
        if let Some(provider) = self.provider {
            config.provider.name = provider;
        }
        if let Some(ref model) = self.model {
            config.provider.model = model.clone();
        }
    }
}

impl StateArgs {
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(ref url) = self.org_url {
            config.host.organization_url = Some(url.clone());
        }
        if let Some(ref project) = self.project {
            config.host.project = Some(project.clone());
        }
        if let Some(ref repo) = self.repo {
            config.host.repository = Some(repo.clone());
        }
        if self.incremental {
            config.review.incremental = true;
        }
    }
}
