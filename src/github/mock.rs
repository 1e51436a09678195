use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    GitHubApi, Job, NewRelease, PullRequest, ReleaseNotesRequest, RepoContext, WorkflowRun,
};
use crate::error::{ReleaseError, Result};

/// Side effect recorded by [MockGitHub]
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    UpdateVariable { name: String, value: String },
    CreateTagObject { tag: String, message: String, commit_sha: String },
    CreateRef { git_ref: String, sha: String },
    GenerateNotes(ReleaseNotesRequest),
    CreateRelease(NewRelease),
    DispatchWorkflow {
        repo: RepoContext,
        workflow: String,
        git_ref: String,
        inputs: BTreeMap<String, String>,
    },
}

#[derive(Default)]
struct MockState {
    pulls: HashMap<String, Vec<PullRequest>>,
    variables: HashMap<String, String>,
    commit_refs: HashMap<String, String>,
    notes: String,
    /// Successive answers of `list_workflow_runs`; the last one repeats
    run_listings: VecDeque<Vec<WorkflowRun>>,
    /// Successive answers of `get_workflow_run`; the last one repeats
    run_states: VecDeque<WorkflowRun>,
    jobs: Vec<Job>,
    job_logs: HashMap<u64, String>,
    failing: HashSet<&'static str>,
    calls: Vec<MockCall>,
}

/// In-memory GitHub for tests without network access
pub struct MockGitHub {
    state: Mutex<MockState>,
}

impl MockGitHub {
    /// Create a new empty mock
    pub fn new() -> Self {
        MockGitHub {
            state: Mutex::new(MockState {
                notes: "## What's Changed".to_string(),
                ..MockState::default()
            }),
        }
    }

    /// Associate pull requests with a commit
    pub fn add_pull_requests(&self, sha: impl Into<String>, prs: Vec<PullRequest>) {
        self.lock().pulls.insert(sha.into(), prs);
    }

    /// Set a repository variable
    pub fn set_variable(&self, name: impl Into<String>, value: impl Into<String>) {
        self.lock().variables.insert(name.into(), value.into());
    }

    /// Current value of a repository variable
    pub fn variable(&self, name: &str) -> Option<String> {
        self.lock().variables.get(name).cloned()
    }

    /// Resolve `git_ref` (e.g. "heads/release") to `sha`
    pub fn set_commit_ref(&self, git_ref: impl Into<String>, sha: impl Into<String>) {
        self.lock().commit_refs.insert(git_ref.into(), sha.into());
    }

    pub fn set_release_notes(&self, notes: impl Into<String>) {
        self.lock().notes = notes.into();
    }

    /// Queue an answer for `list_workflow_runs`
    pub fn push_run_listing(&self, runs: Vec<WorkflowRun>) {
        self.lock().run_listings.push_back(runs);
    }

    /// Queue an answer for `get_workflow_run`
    pub fn push_run_state(&self, run: WorkflowRun) {
        self.lock().run_states.push_back(run);
    }

    pub fn set_jobs(&self, jobs: Vec<Job>) {
        self.lock().jobs = jobs;
    }

    pub fn set_job_logs(&self, job_id: u64, logs: impl Into<String>) {
        self.lock().job_logs.insert(job_id, logs.into());
    }

    /// Make the named trait method fail with a 500 API error
    pub fn fail_on(&self, method: &'static str) {
        self.lock().failing.insert(method);
    }

    /// Side effects recorded so far, in call order
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self, method: &'static str) -> Result<()> {
        if self.lock().failing.contains(method) {
            return Err(ReleaseError::api(500, format!("{} failed", method)));
        }
        Ok(())
    }
}

impl Default for MockGitHub {
    fn default() -> Self {
        Self::new()
    }
}

fn next_answer<T: Clone>(queue: &mut VecDeque<T>) -> Option<T> {
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

#[async_trait]
impl GitHubApi for MockGitHub {
    async fn list_pull_requests_for_commit(
        &self,
        _repo: &RepoContext,
        sha: &str,
    ) -> Result<Vec<PullRequest>> {
        self.check("list_pull_requests_for_commit")?;
        Ok(self.lock().pulls.get(sha).cloned().unwrap_or_default())
    }

    async fn get_variable(&self, _repo: &RepoContext, name: &str) -> Result<String> {
        self.check("get_variable")?;
        self.lock()
            .variables
            .get(name)
            .cloned()
            .ok_or_else(|| ReleaseError::api(404, "Not Found"))
    }

    async fn update_variable(&self, _repo: &RepoContext, name: &str, value: &str) -> Result<()> {
        self.check("update_variable")?;
        let mut state = self.lock();
        state.variables.insert(name.to_string(), value.to_string());
        state.calls.push(MockCall::UpdateVariable {
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    async fn get_commit_sha(&self, _repo: &RepoContext, git_ref: &str) -> Result<String> {
        self.check("get_commit_sha")?;
        self.lock()
            .commit_refs
            .get(git_ref)
            .cloned()
            .ok_or_else(|| ReleaseError::api(422, format!("No commit found for SHA: {}", git_ref)))
    }

    async fn create_tag_object(
        &self,
        _repo: &RepoContext,
        tag: &str,
        message: &str,
        commit_sha: &str,
    ) -> Result<String> {
        self.check("create_tag_object")?;
        self.lock().calls.push(MockCall::CreateTagObject {
            tag: tag.to_string(),
            message: message.to_string(),
            commit_sha: commit_sha.to_string(),
        });
        Ok(format!("tagobj-{}", tag))
    }

    async fn create_ref(&self, _repo: &RepoContext, git_ref: &str, sha: &str) -> Result<()> {
        self.check("create_ref")?;
        self.lock().calls.push(MockCall::CreateRef {
            git_ref: git_ref.to_string(),
            sha: sha.to_string(),
        });
        Ok(())
    }

    async fn generate_release_notes(
        &self,
        _repo: &RepoContext,
        request: &ReleaseNotesRequest,
    ) -> Result<String> {
        self.check("generate_release_notes")?;
        let mut state = self.lock();
        state.calls.push(MockCall::GenerateNotes(request.clone()));
        Ok(state.notes.clone())
    }

    async fn create_release(&self, repo: &RepoContext, release: &NewRelease) -> Result<String> {
        self.check("create_release")?;
        self.lock().calls.push(MockCall::CreateRelease(release.clone()));
        Ok(format!(
            "https://github.com/{}/{}/releases/tag/untagged-{}",
            repo.owner, repo.repo, release.tag_name
        ))
    }

    async fn dispatch_workflow(
        &self,
        repo: &RepoContext,
        workflow: &str,
        git_ref: &str,
        inputs: &BTreeMap<String, String>,
    ) -> Result<()> {
        self.check("dispatch_workflow")?;
        self.lock().calls.push(MockCall::DispatchWorkflow {
            repo: repo.clone(),
            workflow: workflow.to_string(),
            git_ref: git_ref.to_string(),
            inputs: inputs.clone(),
        });
        Ok(())
    }

    async fn list_workflow_runs(
        &self,
        _repo: &RepoContext,
        _workflow: &str,
        _created_since: DateTime<Utc>,
    ) -> Result<Vec<WorkflowRun>> {
        self.check("list_workflow_runs")?;
        Ok(next_answer(&mut self.lock().run_listings).unwrap_or_default())
    }

    async fn get_workflow_run(&self, _repo: &RepoContext, run_id: u64) -> Result<WorkflowRun> {
        self.check("get_workflow_run")?;
        next_answer(&mut self.lock().run_states)
            .ok_or_else(|| ReleaseError::api(404, format!("Run {} not found", run_id)))
    }

    async fn list_jobs(&self, _repo: &RepoContext, _run_id: u64) -> Result<Vec<Job>> {
        self.check("list_jobs")?;
        Ok(self.lock().jobs.clone())
    }

    async fn download_job_logs(&self, _repo: &RepoContext, job_id: u64) -> Result<String> {
        self.check("download_job_logs")?;
        self.lock()
            .job_logs
            .get(&job_id)
            .cloned()
            .ok_or_else(|| ReleaseError::api(410, "Logs expired"))
    }
}
