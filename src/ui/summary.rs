//! Markdown blocks appended to the Actions job summary.

/// Summary after the release tag was created
pub fn tag_summary(
    previous_version: &str,
    new_version: &str,
    tag: &str,
    release_branch_sha: &str,
    pr_url: &str,
    label: Option<&str>,
) -> String {
    format!(
        "\n### Successful Tag Creation!\n\
         - After merge to the release branch, a tag was created.\n\
         - Previous version was {previous}\n\
         - New version is {new}\n\
         - Version selected by label `{label}` on {pr_url}\n\
         - Tag {tag} created for version {new} using the new release branch SHA: {sha}\n",
        previous = previous_version,
        new = new_version,
        label = label.unwrap_or("none"),
        pr_url = pr_url,
        tag = tag,
        sha = release_branch_sha,
    )
}

/// Summary after the draft release was created
pub fn release_notes_summary(
    release_url: &str,
    current_version: &str,
    previous_version: Option<&str>,
) -> String {
    format!(
        "\n### Release Notes Created!\n\
         [Link to the draft release notes]({url})\n\
         Draft notes created based on the update to {current}\n\
         and comparing the tag from the previous version: {previous}\n",
        url = release_url,
        current = current_version,
        previous = previous_version.unwrap_or("none"),
    )
}

/// "passed" or "failed" for a workflow conclusion
pub fn result_text(conclusion: Option<&str>) -> &'static str {
    if conclusion == Some("success") {
        "passed"
    } else {
        "failed"
    }
}

/// Summary of a regression workflow run
pub fn regression_summary(conclusion: Option<&str>, run_url: &str) -> String {
    format!(
        "### Workflow Result\nResult: {}\n[Link to Workflow Run]({})\n",
        result_text(conclusion),
        run_url
    )
}
