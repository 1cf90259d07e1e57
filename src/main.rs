//! recheck — incremental AI review for Azure DevOps pull requests.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use std::path::Path;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use recheck::changeset::{self, ChangeSetOptions};
use recheck::config::Config;
use recheck::constants;
use recheck::env::Env;
use recheck::host::azure::AzureClient;
use recheck::host::ContentFetcher;
use recheck::models::review::ReviewMode;
use recheck::output::{self, PublishOutcome};
use recheck::reviewer::rig::RigReviewer;
use recheck::reviewer::Reviewer;
use recheck::state::scope::{self, ScopeOutcome};
use recheck::state::{self, TrackerOptions};

use cli::args::{Cli, Command, ReviewArgs, StateArgs};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Review(args) => run_review(*args).await,
        Command::State(args) => run_state(args).await,
        Command::Version => run_version(),
    }
}

fn run_version() -> Result<()> {
    println!("{} {}", "recheck".bold(), constants::VERSION.green().bold());
    Ok(())
}

/// Load layered config and apply CLI overrides on top.
fn load_config(apply: impl FnOnce(&mut Config)) -> Result<Config> {
    let mut config =
        Config::load(Some(Path::new(".")), &Env::real()).context("failed to load configuration")?;
    apply(&mut config);
    Ok(config)
}

/// Build the host client from config. The HTTP client is only
/// constructed here, once, and shared by every request the run makes.
fn build_host(config: &Config) -> Result<Arc<AzureClient>> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(constants::HOST_TIMEOUT_SECS))
        .build()
        .context("failed to build HTTP client")?;

    let client = AzureClient::new(
        http,
        config.host.organization_url()?,
        config.host.project()?,
        config.host.repository()?,
        config.host.token()?,
    );
    Ok(Arc::new(client))
}

fn change_set_options(config: &Config, from_iteration_id: Option<i64>) -> ChangeSetOptions {
    ChangeSetOptions {
        from_iteration_id,
        skip_folders: config.review.skip_folders.clone(),
        max_files: config.review.max_files,
        max_file_chars: config.review.max_file_chars,
        max_total_chars: config.review.max_total_chars,
        batch_width: config.review.batch_width,
        context_lines: config.review.context_lines,
        ..ChangeSetOptions::default()
    }
}

async fn run_review(args: ReviewArgs) -> Result<()> {
    let dry_run = args.dry_run;
    let pr_id = args.pr;
    let config = load_config(|c| args.apply_to(c))?;
    let host = build_host(&config)?;

    let tracker_opts = TrackerOptions {
        incremental: config.review.incremental,
        skip_if_reviewed: config.review.skip_if_reviewed,
    };
    let review_state = state::compute_review_state(&*host, &*host, pr_id, &tracker_opts)
        .await
        .context("failed to compute review state")?;

    if review_state.mode == ReviewMode::SkipNoNewWork {
        print!(
            "{}",
            output::terminal_summary(pr_id, &review_state, 0, 0, &PublishOutcome::Skipped)
        );
        return Ok(());
    }

    // Incremental mode diffs from the last reviewed iteration; full mode
    // covers the whole PR.
    let from_iteration = match review_state.mode {
        ReviewMode::Incremental => review_state.from_iteration_id,
        _ => None,
    };
    let opts = change_set_options(&config, from_iteration);
    let fetcher: Arc<dyn ContentFetcher> = host.clone();
    let document = changeset::build_change_set(&*host, fetcher, pr_id, &opts)
        .await
        .context("failed to assemble change-set")?;

    // Incremental runs additionally drop files the new commits never
    // touched. Failures here widen the scope back to the full document.
    let document = if review_state.mode == ReviewMode::Incremental {
        match scope::paths_touched_by_commits(&*host, pr_id, &review_state.new_commit_ids).await {
            Ok(touched) => match scope::scope_to_paths(&document, &touched) {
                ScopeOutcome::Scoped(scoped) => scoped,
                ScopeOutcome::EmptyScope => {
                    eprintln!(
                        "Warning: new commits touch no reviewable files; reviewing the full change-set"
                    );
                    document
                }
            },
            Err(e) => {
                eprintln!("Warning: could not scope to new commits ({e}); reviewing the full change-set");
                document
            }
        }
    } else {
        document
    };

    if document.shown_files == 0 {
        println!("No reviewable changes on PR {pr_id}; nothing to do.");
        return Ok(());
    }

    let change_set_text = document.render();
    if dry_run {
        print!("{change_set_text}");
        print!(
            "{}",
            output::terminal_summary(
                pr_id,
                &review_state,
                document.shown_files,
                document.total_files,
                &PublishOutcome::Skipped,
            )
        );
        return Ok(());
    }

    let reviewer =
        RigReviewer::new(config.provider.clone()).context("failed to configure reviewer")?;
    let review_text = reviewer
        .review(&change_set_text)
        .await
        .context("review failed")?;

    let body = output::compose_comment_body(&review_text, &review_state, document.latest_iteration);
    let outcome = output::publish_review(&*host, pr_id, &body, &review_state, false)
        .await
        .context("failed to post review comment")?;

    print!(
        "{}",
        output::terminal_summary(
            pr_id,
            &review_state,
            document.shown_files,
            document.total_files,
            &outcome,
        )
    );
    Ok(())
}

/// Inspect a PR's recorded review state without reviewing anything.
async fn run_state(args: StateArgs) -> Result<()> {
    let pr_id = args.pr;
    let config = load_config(|c| args.apply_to(c))?;
    let host = build_host(&config)?;

    let tracker_opts = TrackerOptions {
        incremental: config.review.incremental,
        skip_if_reviewed: config.review.skip_if_reviewed,
    };
    let review_state = state::compute_review_state(&*host, &*host, pr_id, &tracker_opts)
        .await
        .context("failed to compute review state")?;

    println!("{} PR {}", "●".cyan().bold(), pr_id.to_string().bold());
    println!("  mode:             {}", review_state.mode.to_string().bold());
    println!("  commits on PR:    {}", review_state.all_commit_ids.len());
    println!("  already reviewed: {}", review_state.reviewed_commit_ids.len());
    println!("  new:              {}", review_state.new_commit_ids.len());
    for id in &review_state.new_commit_ids {
        println!("    {}", id.dimmed());
    }
    match review_state.from_iteration_id {
        Some(iteration) => println!("  last reviewed iteration: {iteration}"),
        None => println!("  last reviewed iteration: (not recorded)"),
    }
    match review_state.canonical {
        Some(c) => println!(
            "  canonical comment: thread {}, comment {}",
            c.thread_id, c.comment_id
        ),
        None => println!("  canonical comment: (none)"),
    }
    Ok(())
}
