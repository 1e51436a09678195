use thiserror::Error;

/// Unified error type for release-tagger operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("GitHub API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Environment error: {0}")]
    Env(String),

    #[error("Pull request error: {0}")]
    PullRequest(String),

    #[error("No SHA found in the response for {0}")]
    MissingSha(String),

    #[error("Timed out after {seconds}s waiting for {what}")]
    Timeout { what: String, seconds: u64 },

    #[error("Workflow failed with conclusion: {conclusion}. See details: {url}")]
    WorkflowFailed { conclusion: String, url: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results in release-tagger
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ReleaseError::Version(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        ReleaseError::Tag(msg.into())
    }

    /// Create an API error from a response status and body
    pub fn api(status: u16, msg: impl Into<String>) -> Self {
        ReleaseError::Api {
            status,
            message: msg.into(),
        }
    }

    /// Create an environment error with context
    pub fn env(msg: impl Into<String>) -> Self {
        ReleaseError::Env(msg.into())
    }

    /// Create a pull request error with context
    pub fn pull_request(msg: impl Into<String>) -> Self {
        ReleaseError::PullRequest(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(what: impl Into<String>, seconds: u64) -> Self {
        ReleaseError::Timeout {
            what: what.into(),
            seconds,
        }
    }

    /// Create a failed-workflow error
    pub fn workflow_failed(conclusion: impl Into<String>, url: impl Into<String>) -> Self {
        ReleaseError::WorkflowFailed {
            conclusion: conclusion.into(),
            url: url.into(),
        }
    }

    /// True when the GitHub API answered 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReleaseError::Api { status: 404, .. })
    }
}
