//! GitHub REST API abstraction layer
//!
//! This module provides a trait-based abstraction over the handful of GitHub
//! endpoints the release pipeline needs, allowing the pipeline to run against
//! the real API or an in-memory mock.
//!
//! # Overview
//!
//! The primary abstraction is the [GitHubApi] trait. The concrete implementations are:
//!
//! - [client::GitHubClient]: HTTP implementation using `reqwest`
//! - [mock::MockGitHub]: in-memory implementation for tests
//!
//! Pipeline code should depend on [GitHubApi] rather than a concrete client.

pub mod client;
pub mod mock;

pub use client::GitHubClient;
pub use mock::MockGitHub;

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ReleaseError, Result};

/// Repository coordinates (`owner/repo`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoContext {
    pub owner: String,
    pub repo: String,
}

impl RepoContext {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        RepoContext {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parse the `owner/repo` form used by `GITHUB_REPOSITORY`
    pub fn parse(full_name: &str) -> Result<Self> {
        match full_name.trim().split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                Ok(RepoContext::new(owner, repo))
            }
            _ => Err(ReleaseError::env(format!(
                "Invalid repository '{}' - expected owner/repo",
                full_name
            ))),
        }
    }
}

impl fmt::Display for RepoContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Pull request label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

/// Pull request as returned by the commit-to-pulls endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl PullRequest {
    pub fn label_names(&self) -> Vec<String> {
        self.labels.iter().map(|l| l.name.clone()).collect()
    }
}

/// Parameters of the generate-release-notes endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleaseNotesRequest {
    pub tag_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_tag_name: Option<String>,
    pub configuration_file_path: String,
}

/// Body of the create-release endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRelease {
    pub tag_name: String,
    pub name: String,
    pub body: String,
    pub draft: bool,
    pub prerelease: bool,
}

/// Actions workflow run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub html_url: String,
}

impl WorkflowRun {
    pub fn is_completed(&self) -> bool {
        self.status.as_deref() == Some("completed")
    }
}

/// Job inside a workflow run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub conclusion: Option<String>,
}

/// The GitHub operations used by the release and regression pipelines
///
/// All implementors must be `Send + Sync`. Non-2xx responses are reported as
/// [ReleaseError::Api] so callers can distinguish API failures from transport errors.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Pull requests associated with a commit, most relevant first
    async fn list_pull_requests_for_commit(
        &self,
        repo: &RepoContext,
        sha: &str,
    ) -> Result<Vec<PullRequest>>;

    /// Value of a repository Actions variable
    async fn get_variable(&self, repo: &RepoContext, name: &str) -> Result<String>;

    /// Overwrite a repository Actions variable
    async fn update_variable(&self, repo: &RepoContext, name: &str, value: &str) -> Result<()>;

    /// Resolve a ref (e.g. "heads/release") to a commit sha
    async fn get_commit_sha(&self, repo: &RepoContext, git_ref: &str) -> Result<String>;

    /// Create an annotated tag object for a commit, returning the tag object sha
    async fn create_tag_object(
        &self,
        repo: &RepoContext,
        tag: &str,
        message: &str,
        commit_sha: &str,
    ) -> Result<String>;

    /// Create a reference (e.g. "refs/tags/1.2.3") pointing at `sha`
    async fn create_ref(&self, repo: &RepoContext, git_ref: &str, sha: &str) -> Result<()>;

    /// Generate release notes body from the commit history between two tags
    async fn generate_release_notes(
        &self,
        repo: &RepoContext,
        request: &ReleaseNotesRequest,
    ) -> Result<String>;

    /// Create a release, returning its html url
    async fn create_release(&self, repo: &RepoContext, release: &NewRelease) -> Result<String>;

    /// Trigger a `workflow_dispatch` event
    async fn dispatch_workflow(
        &self,
        repo: &RepoContext,
        workflow: &str,
        git_ref: &str,
        inputs: &BTreeMap<String, String>,
    ) -> Result<()>;

    /// Runs of a workflow created at or after `created_since`, newest first
    async fn list_workflow_runs(
        &self,
        repo: &RepoContext,
        workflow: &str,
        created_since: DateTime<Utc>,
    ) -> Result<Vec<WorkflowRun>>;

    async fn get_workflow_run(&self, repo: &RepoContext, run_id: u64) -> Result<WorkflowRun>;

    async fn list_jobs(&self, repo: &RepoContext, run_id: u64) -> Result<Vec<Job>>;

    /// Plain-text logs of a job
    async fn download_job_logs(&self, repo: &RepoContext, job_id: u64) -> Result<String>;
}

/// Web url of a workflow run
pub fn workflow_run_url(repo: &RepoContext, run_id: u64) -> String {
    format!("https://github.com/{}/{}/actions/runs/{}", repo.owner, repo.repo, run_id)
}
