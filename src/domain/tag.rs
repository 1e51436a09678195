use crate::domain::Version;
use crate::error::{ReleaseError, Result};

/// Tag naming pattern (e.g., "{version}", "v{version}")
#[derive(Debug, Clone)]
pub struct TagPattern {
    pub pattern: String,
}

impl TagPattern {
    /// Create a new tag pattern, rejecting patterns without a `{version}` placeholder
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        if !pattern.contains("{version}") {
            return Err(ReleaseError::tag(format!(
                "Pattern '{}' must contain {{version}} placeholder",
                pattern
            )));
        }
        Ok(TagPattern { pattern })
    }

    /// Format a version according to pattern
    /// Example: pattern="v{version}", version=1.2.3 -> "v1.2.3"
    pub fn format(&self, version: &Version) -> String {
        self.pattern.replace("{version}", &version.to_string())
    }

    /// Validate if a tag matches this pattern
    pub fn matches(&self, tag: &str) -> Result<bool> {
        let escaped = regex::escape(&self.pattern);
        let regex_pattern = escaped.replace(r"\{version\}", r"(\d+\.\d+\.\d+)");

        regex::Regex::new(&format!("^{}$", regex_pattern))
            .map(|re| re.is_match(tag))
            .map_err(|e| ReleaseError::tag(format!("Invalid pattern: {}", e)))
    }
}

impl Default for TagPattern {
    fn default() -> Self {
        TagPattern {
            pattern: "{version}".to_string(),
        }
    }
}

/// Message stored on the annotated tag object
pub fn tag_message(version: &Version) -> String {
    format!("Release for version {}", version)
}

/// Fully-qualified ref for a tag name
pub fn tag_ref(tag: &str) -> String {
    format!("refs/tags/{}", tag)
}
