use crate::config::LabelsConfig;
use crate::domain::{Version, VersionBump};
use crate::error::Result;

/// Outcome of classifying a pull request's labels against the current version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpDecision {
    pub bump: VersionBump,
    /// Label that selected the bump; `None` when the pull request had no labels
    pub applied_label: Option<String>,
    pub previous: Version,
    pub next: Version,
}

/// Analyzes pull request labels to determine the version bump
pub struct LabelAnalyzer {
    config: LabelsConfig,
}

impl LabelAnalyzer {
    /// Create a new label analyzer
    pub fn new(config: LabelsConfig) -> Self {
        LabelAnalyzer { config }
    }

    /// Classify labels: major beats patch, anything else is a minor bump
    pub fn classify<S: AsRef<str>>(&self, labels: &[S]) -> (VersionBump, Option<String>) {
        if let Some(label) = first_in(labels, &self.config.major) {
            return (VersionBump::Major, Some(label));
        }

        if let Some(label) = first_in(labels, &self.config.patch) {
            return (VersionBump::Patch, Some(label));
        }

        let applied = labels.first().map(|l| l.as_ref().to_string());
        (VersionBump::Minor, applied)
    }

    /// Compute the next version for the given labels
    pub fn decide<S: AsRef<str>>(&self, current: Version, labels: &[S]) -> Result<BumpDecision> {
        let (bump, applied_label) = self.classify(labels);
        Ok(BumpDecision {
            bump,
            applied_label,
            previous: current,
            next: current.bump(&bump)?,
        })
    }
}

impl Default for LabelAnalyzer {
    fn default() -> Self {
        Self::new(LabelsConfig::default())
    }
}

fn first_in<S: AsRef<str>>(labels: &[S], class: &[String]) -> Option<String> {
    labels
        .iter()
        .map(|label| label.as_ref())
        .find(|name| class.iter().any(|c| c.as_str() == *name))
        .map(str::to_string)
}
