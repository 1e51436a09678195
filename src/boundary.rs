use std::fmt;

/// Non-fatal conditions met while releasing.
/// These are reported to the user but do not fail the step.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// The merged pull request carries no labels; a minor bump is applied
    NoLabels { pr_number: u64 },
    /// The commit is associated with more than one pull request
    MultiplePullRequests { count: usize, used: u64 },
    /// No previous version was provided for release notes
    MissingPreviousVersion { current: String },
    /// The regression job was not found in the workflow run
    JobNotFound { job: String, run_url: String },
    /// Job logs could not be downloaded
    JobLogsUnavailable { job: String, reason: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoLabels { pr_number } => {
                write!(
                    f,
                    "Pull request #{} has no labels, applying a minor bump",
                    pr_number
                )
            }
            BoundaryWarning::MultiplePullRequests { count, used } => {
                write!(
                    f,
                    "Commit is associated with {} pull requests, using #{}",
                    count, used
                )
            }
            BoundaryWarning::MissingPreviousVersion { current } => {
                write!(
                    f,
                    "No previous version given, notes for '{}' cover the full history",
                    current
                )
            }
            BoundaryWarning::JobNotFound { job, run_url } => {
                write!(f, "Job '{}' not found in workflow run {}", job, run_url)
            }
            BoundaryWarning::JobLogsUnavailable { job, reason } => {
                write!(f, "Could not fetch logs for job '{}': {}", job, reason)
            }
        }
    }
}
