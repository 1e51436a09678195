use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use release_tagger::actions::{self, ActionsRunner};
use release_tagger::analyzer::LabelAnalyzer;
use release_tagger::cli::{self, WorkflowContext};
use release_tagger::config::{self, Config};
use release_tagger::domain::Version;
use release_tagger::github::client::DEFAULT_API_URL;
use release_tagger::github::GitHubClient;
use release_tagger::ui;

#[derive(clap::Parser)]
#[command(
    name = "release-tagger",
    version,
    about = "Tag releases, bump versions and draft release notes from pull request labels"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, global = true, help = "Preview what would happen without making changes")]
    dry_run: bool,

    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Tag the release branch head and store the new version
    Tag {
        #[arg(long, env = "GITHUB_SHA", help = "Merge commit of the pull request")]
        sha: String,
    },
    /// Generate release notes and create a draft release
    Notes {
        #[arg(
            long,
            env = "previousVersion",
            help = "Version released before the current one"
        )]
        previous_version: Option<String>,
    },
    /// Show the pull request data and next version for a merge commit
    PrData {
        #[arg(long, env = "GITHUB_SHA", help = "Merge commit of the pull request")]
        sha: String,
    },
    /// Trigger the regression workflow and wait for its result
    Regression {
        #[arg(long, env = "ENVIRONMENT", help = "Environment the regression runs against")]
        environment: String,
    },
    /// Compute the next version offline
    Bump {
        /// Current version (X.Y.Z)
        version: String,
        /// Pull request labels
        labels: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ActionsRunner::from_env().set_failed(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref()).context("Error loading config")?;

    match args.command {
        Command::Bump { version, labels } => {
            let current = Version::parse(&version)?;
            let decision = LabelAnalyzer::new(config.labels).decide(current, &labels)?;
            ui::display_decision(&decision);
            println!("{}", decision.next);
        }
        Command::Tag { sha } => {
            let (client, ctx) = connect(config, args.dry_run)?;
            let result = cli::create_and_post_tag(&client, &ctx, &sha)
                .await
                .context("Failed to create release tag")?;
            println!(
                "\n{} Published tag {} (previous version {})\n",
                console::style("✓").green(),
                result.tag,
                result.previous_version
            );
        }
        Command::Notes { previous_version } => {
            let (client, ctx) = connect(config, args.dry_run)?;
            let today = chrono::Local::now().date_naive();
            let result =
                cli::create_release_notes(&client, &ctx, previous_version.as_deref(), today)
                    .await
                    .context("Failed to create release notes")?;
            if let Some(url) = result.release_url {
                println!("{}", url);
            }
        }
        Command::PrData { sha } => {
            let (client, ctx) = connect(config, args.dry_run)?;
            let data = cli::pr_data(&client, &ctx, &sha)
                .await
                .context("Error processing PR data")?;
            println!("pr: #{} {}", data.pr_number, data.pr_url);
            println!("label: {}", data.label.as_deref().unwrap_or("none"));
            println!("bump: {}", data.bump);
            println!("current: {}", data.current_version);
            println!("next: {}", data.new_version);
            println!("release branch sha: {}", data.release_branch_sha);
        }
        Command::Regression { environment } => {
            let (client, ctx) = connect(config, args.dry_run)?;
            cli::trigger_regression(&client, &ctx, &environment)
                .await
                .context("Regression run failed")?;
        }
    }

    Ok(())
}

/// Build the API client and workflow context from the Actions environment
fn connect(config: Config, dry_run: bool) -> Result<(GitHubClient, WorkflowContext)> {
    let token = actions::required_env("GITHUB_TOKEN")?;
    let api_url =
        actions::optional_env("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let client = GitHubClient::with_base_url(&token, &api_url)?;
    let repo = actions::repo_from_env()?;
    let ctx = WorkflowContext::new(repo, config, ActionsRunner::from_env()).with_dry_run(dry_run);
    Ok((client, ctx))
}
