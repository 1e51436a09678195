use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{ReleaseError, Result};

/// File name searched for in the working directory and the user config directory.
pub const CONFIG_FILE_NAME: &str = "release-tagger.toml";

/// Represents the complete configuration for release-tagger.
///
/// Contains the label classification, release settings, and the regression workflow to trigger.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub labels: LabelsConfig,

    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default)]
    pub regression: RegressionConfig,
}

/// Returns the default list of labels that trigger major version bumps.
fn default_major_labels() -> Vec<String> {
    vec![
        "breaking-change".to_string(),
        "breaking".to_string(),
        "major".to_string(),
    ]
}

/// Returns the default list of labels that trigger patch version bumps.
fn default_patch_labels() -> Vec<String> {
    vec![
        "hotfix".to_string(),
        "security".to_string(),
        "bug".to_string(),
        "internal".to_string(),
    ]
}

/// Pull request labels that select the version bump.
///
/// Any label not listed here results in a minor bump.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LabelsConfig {
    #[serde(default = "default_major_labels")]
    pub major: Vec<String>,

    #[serde(default = "default_patch_labels")]
    pub patch: Vec<String>,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        LabelsConfig {
            major: default_major_labels(),
            patch: default_patch_labels(),
        }
    }
}

fn default_variable() -> String {
    "RELEASE_VERSION".to_string()
}

fn default_branch() -> String {
    "release".to_string()
}

fn default_tag_pattern() -> String {
    "{version}".to_string()
}

fn default_notes_config() -> String {
    ".github/release.yaml".to_string()
}

fn default_true() -> bool {
    true
}

/// Where the release version lives and how tags and releases are produced.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReleaseConfig {
    /// Repository Actions variable holding the last published version
    #[serde(default = "default_variable")]
    pub variable: String,

    /// Branch whose head commit is tagged
    #[serde(default = "default_branch")]
    pub branch: String,

    #[serde(default = "default_tag_pattern")]
    pub tag_pattern: String,

    /// Release-notes configuration file passed to the generate-notes endpoint
    #[serde(default = "default_notes_config")]
    pub notes_config: String,

    #[serde(default = "default_true")]
    pub draft: bool,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            variable: default_variable(),
            branch: default_branch(),
            tag_pattern: default_tag_pattern(),
            notes_config: default_notes_config(),
            draft: true,
        }
    }
}

fn default_workflow() -> String {
    "regression.yml".to_string()
}

fn default_workflow_ref() -> String {
    "master".to_string()
}

fn default_job_name() -> String {
    "Test in {environment}".to_string()
}

fn default_initial_delay_secs() -> u64 {
    5
}

fn default_discovery_interval_secs() -> u64 {
    1
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_timeout_secs() -> u64 {
    3600
}

/// Regression workflow dispatched in another repository after a deploy.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RegressionConfig {
    /// Owner of the repository hosting the regression workflow; defaults to the current owner
    #[serde(default)]
    pub owner: Option<String>,

    /// Repository hosting the regression workflow; defaults to the current repository
    #[serde(default)]
    pub repo: Option<String>,

    #[serde(default = "default_workflow")]
    pub workflow: String,

    #[serde(default = "default_workflow_ref", rename = "ref")]
    pub git_ref: String,

    /// Job whose result is reported; `{environment}` is substituted
    #[serde(default = "default_job_name")]
    pub job_name: String,

    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: u64,

    #[serde(default = "default_discovery_interval_secs")]
    pub discovery_interval_secs: u64,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl RegressionConfig {
    /// Job name for a given environment
    pub fn job_name_for(&self, environment: &str) -> String {
        self.job_name.replace("{environment}", environment)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }

    pub fn discovery_interval(&self) -> Duration {
        Duration::from_secs(self.discovery_interval_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RegressionConfig {
    fn default() -> Self {
        RegressionConfig {
            owner: None,
            repo: None,
            workflow: default_workflow(),
            git_ref: default_workflow_ref(),
            job_name: default_job_name(),
            initial_delay_secs: default_initial_delay_secs(),
            discovery_interval_secs: default_discovery_interval_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `release-tagger.toml` in current directory
/// 3. `release-tagger.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        fs::read_to_string(CONFIG_FILE_NAME)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    parse_config(&config_str)
}

/// Parses configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).map_err(|e| ReleaseError::config(e.to_string()))
}
