//! GitHub Actions runner integration: step outputs, job summaries and failure annotations.

use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::error::{ReleaseError, Result};
use crate::github::RepoContext;

const MULTILINE_DELIMITER: &str = "RELEASE_TAGGER_EOF";

/// Files the runner exposes for step outputs and the job summary.
///
/// When a file is not configured (running outside Actions) the content is logged instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionsRunner {
    output_file: Option<PathBuf>,
    summary_file: Option<PathBuf>,
}

impl ActionsRunner {
    pub fn new(output_file: Option<PathBuf>, summary_file: Option<PathBuf>) -> Self {
        ActionsRunner {
            output_file,
            summary_file,
        }
    }

    /// Read `GITHUB_OUTPUT` and `GITHUB_STEP_SUMMARY`
    pub fn from_env() -> Self {
        ActionsRunner {
            output_file: optional_env("GITHUB_OUTPUT").map(PathBuf::from),
            summary_file: optional_env("GITHUB_STEP_SUMMARY").map(PathBuf::from),
        }
    }

    /// Set a step output consumed by later workflow steps
    pub fn set_output(&self, name: &str, value: &str) -> Result<()> {
        let Some(path) = &self.output_file else {
            info!("output {}={}", name, value);
            return Ok(());
        };

        let entry = if value.contains('\n') {
            if value.contains(MULTILINE_DELIMITER) {
                return Err(ReleaseError::env(format!(
                    "Output '{}' contains the reserved delimiter",
                    name
                )));
            }
            format!(
                "{name}<<{d}\n{value}\n{d}\n",
                name = name,
                value = value,
                d = MULTILINE_DELIMITER
            )
        } else {
            format!("{}={}\n", name, value)
        };
        append(path, &entry)
    }

    /// Append markdown to the job summary, or log it outside Actions
    pub fn append_summary(&self, markdown: &str) -> Result<()> {
        match &self.summary_file {
            Some(path) => append(path, markdown),
            None => {
                info!("summary:\n{}", markdown);
                Ok(())
            }
        }
    }

    /// Report a failure as an error annotation on the workflow run
    pub fn set_failed(&self, message: &str) {
        error!("{}", message);
        println!("::error::{}", escape_annotation(message));
    }
}

fn append(path: &Path, content: &str) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Workflow command data must encode `%`, CR and LF
fn escape_annotation(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Non-empty environment variable
pub fn optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Required environment variable
pub fn required_env(name: &str) -> Result<String> {
    optional_env(name).ok_or_else(|| ReleaseError::env(format!("{} is not set", name)))
}

/// Repository the workflow runs in, from `GITHUB_REPOSITORY`
pub fn repo_from_env() -> Result<RepoContext> {
    RepoContext::parse(&required_env("GITHUB_REPOSITORY")?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::NamedTempFile;

    #[test]
    fn test_set_output_appends_lines() {
        let file = NamedTempFile::new().unwrap();
        let runner = ActionsRunner::new(Some(file.path().to_path_buf()), None);

        runner.set_output("previousVersion", "1.2.3").unwrap();
        runner.set_output("newVersion", "1.3.0").unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(content, "previousVersion=1.2.3\nnewVersion=1.3.0\n");
    }

    #[test]
    fn test_set_output_multiline() {
        let file = NamedTempFile::new().unwrap();
        let runner = ActionsRunner::new(Some(file.path().to_path_buf()), None);

        runner.set_output("notes", "line one\nline two").unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(
            content,
            "notes<<RELEASE_TAGGER_EOF\nline one\nline two\nRELEASE_TAGGER_EOF\n"
        );
    }

    #[test]
    fn test_append_summary() {
        let file = NamedTempFile::new().unwrap();
        let runner = ActionsRunner::new(None, Some(file.path().to_path_buf()));

        runner.append_summary("### One\n").unwrap();
        runner.append_summary("### Two\n").unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(content, "### One\n### Two\n");
    }

    #[test]
    fn test_without_files_is_noop() {
        let runner = ActionsRunner::default();
        assert!(runner.set_output("a", "b").is_ok());
        assert!(runner.append_summary("text").is_ok());
    }

    #[test]
    fn test_escape_annotation() {
        assert_eq!(escape_annotation("50% done\nnext"), "50%25 done%0Anext");
    }

    #[test]
    #[serial]
    fn test_repo_from_env() {
        env::set_var("GITHUB_REPOSITORY", "acme/notify-api");
        let repo = repo_from_env().unwrap();
        assert_eq!(repo, RepoContext::new("acme", "notify-api"));

        env::remove_var("GITHUB_REPOSITORY");
        assert!(repo_from_env().is_err());
    }

    #[test]
    #[serial]
    fn test_blank_env_is_missing() {
        env::set_var("RELEASE_TAGGER_TEST_BLANK", "  ");
        assert_eq!(optional_env("RELEASE_TAGGER_TEST_BLANK"), None);
        assert!(required_env("RELEASE_TAGGER_TEST_BLANK").is_err());
        env::remove_var("RELEASE_TAGGER_TEST_BLANK");
    }
}
