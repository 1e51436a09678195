//! Draft release creation from generated release notes

use chrono::NaiveDate;
use tracing::info;

use super::orchestration::WorkflowContext;
use crate::boundary::BoundaryWarning;
use crate::domain::{release_title, TagPattern, Version};
use crate::error::Result;
use crate::github::{GitHubApi, NewRelease, ReleaseNotesRequest};
use crate::ui;

/// Result of a release-notes run
#[derive(Debug, Clone, PartialEq)]
pub struct NotesResult {
    pub tag: String,
    pub previous_tag: Option<String>,
    pub title: String,
    pub notes: String,
    /// `None` in dry-run mode
    pub release_url: Option<String>,
}

/// Generate notes between the previous and current release tags and publish a draft release
///
/// The current version is read from the release variable; `previous_version` is
/// the value the tagging step emitted as `previousVersion`.
pub async fn create_release_notes<A: GitHubApi + ?Sized>(
    api: &A,
    ctx: &WorkflowContext,
    previous_version: Option<&str>,
    today: NaiveDate,
) -> Result<NotesResult> {
    let pattern = ctx.tag_pattern()?;
    let stored = api
        .get_variable(&ctx.repo, &ctx.config.release.variable)
        .await?;
    let current = Version::parse(&stored)?;
    let tag = pattern.format(&current);

    let previous_tag = previous_version
        .map(|p| previous_tag_name(&pattern, p))
        .transpose()?;
    if previous_tag.is_none() {
        ui::display_boundary_warning(&BoundaryWarning::MissingPreviousVersion {
            current: tag.clone(),
        });
    }

    let request = ReleaseNotesRequest {
        tag_name: tag.clone(),
        previous_tag_name: previous_tag.clone(),
        configuration_file_path: ctx.config.release.notes_config.clone(),
    };
    let notes = api.generate_release_notes(&ctx.repo, &request).await?;
    info!("Release notes generated successfully for {}", tag);

    let title = release_title(&tag, today);
    let release_url = if ctx.dry_run {
        ui::display_status(&format!("Dry run: would create release '{}'", title));
        None
    } else {
        let release = NewRelease {
            tag_name: tag.clone(),
            name: title.clone(),
            body: notes.clone(),
            draft: ctx.config.release.draft,
            prerelease: false,
        };
        let url = api.create_release(&ctx.repo, &release).await?;
        ui::display_success(&format!("Release URL: {}", url));

        ctx.runner.set_output("releaseUrl", &url)?;
        ctx.runner.append_summary(&ui::summary::release_notes_summary(
            &url,
            &tag,
            previous_tag.as_deref(),
        ))?;
        Some(url)
    };

    info!(
        "The previous release version was: {}",
        previous_tag.as_deref().unwrap_or("none")
    );

    Ok(NotesResult {
        tag,
        previous_tag,
        title,
        notes,
        release_url,
    })
}

/// Accept either a full tag in the configured pattern or a bare version
fn previous_tag_name(pattern: &TagPattern, previous: &str) -> Result<String> {
    if pattern.matches(previous)? {
        return Ok(previous.to_string());
    }
    Version::parse(previous).map(|v| pattern.format(&v))
}
