//! HTTP implementation of [GitHubApi] backed by `reqwest`.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Method, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use super::{
    GitHubApi, Job, NewRelease, PullRequest, ReleaseNotesRequest, RepoContext, WorkflowRun,
};
use crate::error::{ReleaseError, Result};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Deserialize)]
struct GitHubErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct VariableBody {
    value: String,
}

#[derive(Debug, Deserialize)]
struct ShaBody {
    #[serde(default)]
    sha: String,
}

#[derive(Debug, Deserialize)]
struct NotesBody {
    body: String,
}

#[derive(Debug, Deserialize)]
struct ReleaseBody {
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct RunsBody {
    workflow_runs: Vec<WorkflowRun>,
}

#[derive(Debug, Deserialize)]
struct JobsBody {
    jobs: Vec<Job>,
}

/// GitHub REST client authenticated with a bearer token
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl GitHubClient {
    /// Create a client against a custom API root (GitHub Enterprise or a test server)
    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("release-tagger/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(GitHubClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn repo_url(&self, repo: &RepoContext, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.base_url, repo.owner, repo.repo, path
        )
    }

    async fn send(&self, method: Method, url: &str, body: Option<Value>) -> Result<Response> {
        debug!("{} {}", method, url);

        let mut request = self
            .http
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token));
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GitHubErrorBody>(&text)
            .map(|e| e.message)
            .unwrap_or(text);
        Err(ReleaseError::api(status.as_u16(), message))
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    #[instrument(skip(self), fields(repo = %repo))]
    async fn list_pull_requests_for_commit(
        &self,
        repo: &RepoContext,
        sha: &str,
    ) -> Result<Vec<PullRequest>> {
        let url = self.repo_url(repo, &format!("commits/{}/pulls", sha));
        let prs: Vec<PullRequest> = self.send(Method::GET, &url, None).await?.json().await?;
        debug!("Found {} pull requests for commit {}", prs.len(), sha);
        Ok(prs)
    }

    #[instrument(skip(self), fields(repo = %repo))]
    async fn get_variable(&self, repo: &RepoContext, name: &str) -> Result<String> {
        let url = self.repo_url(repo, &format!("actions/variables/{}", name));
        let variable: VariableBody = self.send(Method::GET, &url, None).await?.json().await?;
        Ok(variable.value)
    }

    #[instrument(skip(self), fields(repo = %repo))]
    async fn update_variable(&self, repo: &RepoContext, name: &str, value: &str) -> Result<()> {
        let url = self.repo_url(repo, &format!("actions/variables/{}", name));
        let body = json!({ "name": name, "value": value });
        self.send(Method::PATCH, &url, Some(body)).await?;
        info!("Updated variable {} to {}", name, value);
        Ok(())
    }

    #[instrument(skip(self), fields(repo = %repo))]
    async fn get_commit_sha(&self, repo: &RepoContext, git_ref: &str) -> Result<String> {
        let url = self.repo_url(repo, &format!("commits/{}", git_ref));
        let commit: ShaBody = self.send(Method::GET, &url, None).await?.json().await?;
        if commit.sha.is_empty() {
            return Err(ReleaseError::MissingSha(git_ref.to_string()));
        }
        Ok(commit.sha)
    }

    #[instrument(skip(self, message), fields(repo = %repo))]
    async fn create_tag_object(
        &self,
        repo: &RepoContext,
        tag: &str,
        message: &str,
        commit_sha: &str,
    ) -> Result<String> {
        let url = self.repo_url(repo, "git/tags");
        let body = json!({
            "tag": tag,
            "message": message,
            "object": commit_sha,
            "type": "commit",
        });
        let created: ShaBody = self.send(Method::POST, &url, Some(body)).await?.json().await?;
        Ok(created.sha)
    }

    #[instrument(skip(self), fields(repo = %repo))]
    async fn create_ref(&self, repo: &RepoContext, git_ref: &str, sha: &str) -> Result<()> {
        let url = self.repo_url(repo, "git/refs");
        let body = json!({ "ref": git_ref, "sha": sha });
        self.send(Method::POST, &url, Some(body)).await?;
        Ok(())
    }

    #[instrument(skip(self, request), fields(repo = %repo, tag = %request.tag_name))]
    async fn generate_release_notes(
        &self,
        repo: &RepoContext,
        request: &ReleaseNotesRequest,
    ) -> Result<String> {
        let url = self.repo_url(repo, "releases/generate-notes");
        let body = serde_json::to_value(request)?;
        let notes: NotesBody = self.send(Method::POST, &url, Some(body)).await?.json().await?;
        Ok(notes.body)
    }

    #[instrument(skip(self, release), fields(repo = %repo, tag = %release.tag_name))]
    async fn create_release(&self, repo: &RepoContext, release: &NewRelease) -> Result<String> {
        let url = self.repo_url(repo, "releases");
        let body = serde_json::to_value(release)?;
        let created: ReleaseBody = self.send(Method::POST, &url, Some(body)).await?.json().await?;
        Ok(created.html_url)
    }

    #[instrument(skip(self, inputs), fields(repo = %repo))]
    async fn dispatch_workflow(
        &self,
        repo: &RepoContext,
        workflow: &str,
        git_ref: &str,
        inputs: &BTreeMap<String, String>,
    ) -> Result<()> {
        let url = self.repo_url(repo, &format!("actions/workflows/{}/dispatches", workflow));
        let body = json!({ "ref": git_ref, "inputs": inputs });
        self.send(Method::POST, &url, Some(body)).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(repo = %repo))]
    async fn list_workflow_runs(
        &self,
        repo: &RepoContext,
        workflow: &str,
        created_since: DateTime<Utc>,
    ) -> Result<Vec<WorkflowRun>> {
        let url = self.repo_url(repo, &format!("actions/workflows/{}/runs", workflow));
        let created = format!(
            ">={}",
            created_since.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        let request = self
            .http
            .get(&url)
            .query(&[("created", created.as_str())])
            .build()?;
        let runs: RunsBody = self
            .send(Method::GET, request.url().as_str(), None)
            .await?
            .json()
            .await?;
        Ok(runs.workflow_runs)
    }

    #[instrument(skip(self), fields(repo = %repo))]
    async fn get_workflow_run(&self, repo: &RepoContext, run_id: u64) -> Result<WorkflowRun> {
        let url = self.repo_url(repo, &format!("actions/runs/{}", run_id));
        Ok(self.send(Method::GET, &url, None).await?.json().await?)
    }

    #[instrument(skip(self), fields(repo = %repo))]
    async fn list_jobs(&self, repo: &RepoContext, run_id: u64) -> Result<Vec<Job>> {
        let url = self.repo_url(repo, &format!("actions/runs/{}/jobs", run_id));
        let jobs: JobsBody = self.send(Method::GET, &url, None).await?.json().await?;
        Ok(jobs.jobs)
    }

    #[instrument(skip(self), fields(repo = %repo))]
    async fn download_job_logs(&self, repo: &RepoContext, job_id: u64) -> Result<String> {
        let url = self.repo_url(repo, &format!("actions/jobs/{}/logs", job_id));
        Ok(self.send(Method::GET, &url, None).await?.text().await?)
    }
}
