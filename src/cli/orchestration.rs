//! Release tagging workflow
//!
//! Runs after a pull request is merged into the release branch: reads the stored
//! release version, classifies the pull request labels, tags the release branch
//! head and stores the new version.

use tracing::info;

use crate::actions::ActionsRunner;
use crate::analyzer::LabelAnalyzer;
use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::domain::{tag_message, tag_ref, ReleaseBranch, TagPattern, Version, VersionBump};
use crate::error::{ReleaseError, Result};
use crate::github::{GitHubApi, RepoContext};
use crate::ui;

/// Shared inputs of every workflow
#[derive(Debug, Clone)]
pub struct WorkflowContext {
    /// Repository the workflow runs in
    pub repo: RepoContext,
    pub config: Config,
    pub runner: ActionsRunner,
    /// Read from the API but skip every mutating call
    pub dry_run: bool,
}

impl WorkflowContext {
    pub fn new(repo: RepoContext, config: Config, runner: ActionsRunner) -> Self {
        WorkflowContext {
            repo,
            config,
            runner,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn tag_pattern(&self) -> Result<TagPattern> {
        TagPattern::new(self.config.release.tag_pattern.clone())
    }
}

/// Everything known about the merged pull request and the version it selects
#[derive(Debug, Clone, PartialEq)]
pub struct PrData {
    pub release_branch_sha: String,
    pub current_version: Version,
    pub new_version: Version,
    pub bump: VersionBump,
    pub label: Option<String>,
    pub pr_number: u64,
    pub pr_url: String,
}

/// Result of a tagging run
#[derive(Debug, Clone, PartialEq)]
pub struct TagResult {
    pub previous_version: Version,
    pub new_version: Version,
    pub tag: String,
    pub release_branch_sha: String,
    /// False in dry-run mode
    pub created: bool,
}

/// Collect pull request data for the merge commit `sha` and compute the next version
pub async fn pr_data<A: GitHubApi + ?Sized>(
    api: &A,
    ctx: &WorkflowContext,
    sha: &str,
) -> Result<PrData> {
    let pulls = api.list_pull_requests_for_commit(&ctx.repo, sha).await?;
    let stored = api
        .get_variable(&ctx.repo, &ctx.config.release.variable)
        .await?;
    let branch = ReleaseBranch::new(ctx.config.release.branch.clone());
    let release_branch_sha = api.get_commit_sha(&ctx.repo, &branch.commit_ref()).await?;
    info!(
        "The {} branch head SHA is: {}",
        branch.name, release_branch_sha
    );

    let pr = pulls.first().ok_or_else(|| {
        ReleaseError::pull_request(format!("No pull request is associated with commit {}", sha))
    })?;
    if pulls.len() > 1 {
        ui::display_boundary_warning(&BoundaryWarning::MultiplePullRequests {
            count: pulls.len(),
            used: pr.number,
        });
    }
    if pr.labels.is_empty() {
        ui::display_boundary_warning(&BoundaryWarning::NoLabels {
            pr_number: pr.number,
        });
    }

    let current_version = Version::parse(&stored)?;
    let decision =
        LabelAnalyzer::new(ctx.config.labels.clone()).decide(current_version, &pr.label_names())?;
    info!("PR #{}: {}", pr.number, ui::format_decision(&decision));

    Ok(PrData {
        release_branch_sha,
        current_version,
        new_version: decision.next,
        bump: decision.bump,
        label: decision.applied_label,
        pr_number: pr.number,
        pr_url: pr.html_url.clone(),
    })
}

/// Create the release tag on the release branch head and store the new version
///
/// Sets the `previousVersion`, `newVersion` and `tag` step outputs and appends a
/// job summary.
pub async fn create_and_post_tag<A: GitHubApi + ?Sized>(
    api: &A,
    ctx: &WorkflowContext,
    sha: &str,
) -> Result<TagResult> {
    let pattern = ctx.tag_pattern()?;
    let data = pr_data(api, ctx, sha).await?;
    let tag = pattern.format(&data.new_version);

    if ctx.dry_run {
        ui::display_status("Dry run:");
        ui::display_success(&format!(
            "  would create tag {} at {}",
            tag, data.release_branch_sha
        ));
        ui::display_success(&format!(
            "  would set {} to {}",
            ctx.config.release.variable, data.new_version
        ));
    } else {
        ui::display_status(&format!("Creating tag: {}", tag));
        let tag_object_sha = api
            .create_tag_object(
                &ctx.repo,
                &tag,
                &tag_message(&data.new_version),
                &data.release_branch_sha,
            )
            .await?;
        api.create_ref(&ctx.repo, &tag_ref(&tag), &tag_object_sha)
            .await?;
        ui::display_success(&format!("Tag {} created and pushed successfully.", tag));

        api.update_variable(
            &ctx.repo,
            &ctx.config.release.variable,
            &data.new_version.to_string(),
        )
        .await?;
    }

    let previous = data.current_version.to_string();
    let next = data.new_version.to_string();
    ctx.runner.set_output("previousVersion", &previous)?;
    ctx.runner.set_output("newVersion", &next)?;
    ctx.runner.set_output("tag", &tag)?;

    if !ctx.dry_run {
        ctx.runner.append_summary(&ui::summary::tag_summary(
            &previous,
            &next,
            &tag,
            &data.release_branch_sha,
            &data.pr_url,
            data.label.as_deref(),
        ))?;
    }

    Ok(TagResult {
        previous_version: data.current_version,
        new_version: data.new_version,
        tag,
        release_branch_sha: data.release_branch_sha,
        created: !ctx.dry_run,
    })
}
