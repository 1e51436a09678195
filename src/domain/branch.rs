/// The branch whose head receives the release tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseBranch {
    pub name: String,
}

impl ReleaseBranch {
    /// Create a new release branch reference
    pub fn new(name: impl Into<String>) -> Self {
        ReleaseBranch { name: name.into() }
    }

    /// Ref used by the commits API to resolve the branch head (e.g. "heads/release")
    pub fn commit_ref(&self) -> String {
        format!("heads/{}", self.name)
    }
}
