//! Regression workflow trigger
//!
//! Dispatches the regression workflow of the QA repository, waits for the run to
//! finish and reports the conclusion of the environment's test job.

use std::collections::BTreeMap;

use chrono::Utc;
use tokio::time::{sleep, Instant};
use tracing::info;

use super::orchestration::WorkflowContext;
use crate::boundary::BoundaryWarning;
use crate::error::{ReleaseError, Result};
use crate::github::{workflow_run_url, GitHubApi, RepoContext};
use crate::poll::{poll_until, PollSettings};
use crate::ui;

/// Outcome of a completed regression run
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionResult {
    pub run_id: u64,
    pub run_url: String,
    pub conclusion: Option<String>,
    /// False when the environment's job was missing from the run
    pub job_found: bool,
}

impl RegressionResult {
    pub fn passed(&self) -> bool {
        self.conclusion.as_deref() == Some("success")
    }
}

/// Repository hosting the regression workflow
pub fn regression_repo(ctx: &WorkflowContext) -> RepoContext {
    let regression = &ctx.config.regression;
    RepoContext::new(
        regression
            .owner
            .clone()
            .unwrap_or_else(|| ctx.repo.owner.clone()),
        regression
            .repo
            .clone()
            .unwrap_or_else(|| ctx.repo.repo.clone()),
    )
}

/// Trigger the regression workflow for `environment` and wait for its result
///
/// Returns `Ok(None)` in dry-run mode. A run that completes with any conclusion
/// other than `success` is reported as [ReleaseError::WorkflowFailed] after the
/// step output and summary are written.
pub async fn trigger_regression<A: GitHubApi + ?Sized>(
    api: &A,
    ctx: &WorkflowContext,
    environment: &str,
) -> Result<Option<RegressionResult>> {
    let settings = &ctx.config.regression;
    let target = regression_repo(ctx);
    let job_name = settings.job_name_for(environment);

    let mut inputs = BTreeMap::new();
    inputs.insert("environment".to_string(), environment.to_string());

    if ctx.dry_run {
        ui::display_status(&format!(
            "Dry run: would trigger {} on {} ({})",
            settings.workflow, target, settings.git_ref
        ));
        return Ok(None);
    }

    let started = Instant::now();
    let triggered_at = Utc::now();
    ui::display_status(&format!(
        "Triggering workflow: {} on {}",
        settings.workflow, target
    ));
    api.dispatch_workflow(&target, &settings.workflow, &settings.git_ref, &inputs)
        .await?;

    // the run is not listed immediately after dispatch
    sleep(settings.initial_delay()).await;

    let workflow = settings.workflow.as_str();
    let target_ref = &target;
    let run = poll_until(
        "workflow run to start",
        PollSettings::new(
            settings.discovery_interval(),
            settings.timeout().saturating_sub(started.elapsed()),
        ),
        move || async move {
            let runs = api
                .list_workflow_runs(target_ref, workflow, triggered_at)
                .await?;
            Ok::<_, ReleaseError>(runs.into_iter().next())
        },
    )
    .await?;
    let run_id = run.id;
    info!("Triggered workflow run ID: {}", run_id);

    let completed = poll_until(
        "workflow run to complete",
        PollSettings::new(
            settings.poll_interval(),
            settings.timeout().saturating_sub(started.elapsed()),
        ),
        move || async move {
            let run = api.get_workflow_run(target_ref, run_id).await?;
            info!("Current status: {}", run.status.as_deref().unwrap_or("unknown"));
            Ok::<_, ReleaseError>(run.is_completed().then_some(run))
        },
    )
    .await?;

    let run_url = if completed.html_url.is_empty() {
        workflow_run_url(&target, run_id)
    } else {
        completed.html_url.clone()
    };
    let conclusion = completed.conclusion.clone();
    info!(
        "Workflow conclusion: {}",
        conclusion.as_deref().unwrap_or("none")
    );
    info!("Workflow run URL: {}", run_url);

    let jobs = api.list_jobs(&target, run_id).await?;
    let Some(job) = jobs.into_iter().find(|j| j.name == job_name) else {
        ui::display_boundary_warning(&BoundaryWarning::JobNotFound {
            job: job_name,
            run_url: run_url.clone(),
        });
        return Ok(Some(RegressionResult {
            run_id,
            run_url,
            conclusion,
            job_found: false,
        }));
    };

    match api.download_job_logs(&target, job.id).await {
        Ok(logs) => info!("Job logs: {}", logs),
        Err(e) => ui::display_boundary_warning(&BoundaryWarning::JobLogsUnavailable {
            job: job.name.clone(),
            reason: e.to_string(),
        }),
    }

    let result_text = ui::summary::result_text(conclusion.as_deref());
    ctx.runner.set_output(
        "regression_result",
        &format!(
            "QA Regression result is {}; link to this run is {}",
            result_text, run_url
        ),
    )?;
    ctx.runner.append_summary(&ui::summary::regression_summary(
        conclusion.as_deref(),
        &run_url,
    ))?;

    let result = RegressionResult {
        run_id,
        run_url,
        conclusion,
        job_found: true,
    };
    if !result.passed() {
        return Err(ReleaseError::workflow_failed(
            result.conclusion.as_deref().unwrap_or("none"),
            result.run_url,
        ));
    }

    ui::display_success(&format!("Regression passed: {}", result.run_url));
    Ok(Some(result))
}
