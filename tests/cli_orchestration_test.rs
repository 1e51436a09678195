use chrono::NaiveDate;
use release_tagger::actions::ActionsRunner;
use release_tagger::cli::{
    create_and_post_tag, create_release_notes, pr_data, trigger_regression, WorkflowContext,
};
use release_tagger::config::Config;
use release_tagger::domain::{Version, VersionBump};
use release_tagger::github::mock::MockCall;
use release_tagger::github::{Job, Label, MockGitHub, PullRequest, RepoContext, WorkflowRun};
use release_tagger::ReleaseError;
use tempfile::NamedTempFile;

const MERGE_SHA: &str = "merge0001";
const RELEASE_SHA: &str = "release0002";

fn pull_request(number: u64, labels: &[&str]) -> PullRequest {
    PullRequest {
        number,
        html_url: format!("https://github.com/acme/notify-api/pull/{}", number),
        labels: labels
            .iter()
            .map(|name| Label {
                name: name.to_string(),
            })
            .collect(),
    }
}

fn release_mock(version: &str, labels: &[&str]) -> MockGitHub {
    let mock = MockGitHub::new();
    mock.set_variable("RELEASE_VERSION", version);
    mock.set_commit_ref("heads/release", RELEASE_SHA);
    mock.add_pull_requests(MERGE_SHA, vec![pull_request(101, labels)]);
    mock
}

struct Runner {
    output: NamedTempFile,
    summary: NamedTempFile,
}

impl Runner {
    fn new() -> Self {
        Runner {
            output: NamedTempFile::new().unwrap(),
            summary: NamedTempFile::new().unwrap(),
        }
    }

    fn context(&self, config: Config) -> WorkflowContext {
        let runner = ActionsRunner::new(
            Some(self.output.path().to_path_buf()),
            Some(self.summary.path().to_path_buf()),
        );
        WorkflowContext::new(RepoContext::new("acme", "notify-api"), config, runner)
    }

    fn outputs(&self) -> String {
        std::fs::read_to_string(self.output.path()).unwrap()
    }

    fn summary(&self) -> String {
        std::fs::read_to_string(self.summary.path()).unwrap()
    }
}

// ============================================================================
// pr_data
// ============================================================================

#[tokio::test]
async fn test_pr_data_minor_bump() {
    let mock = release_mock("1.8.3", &["enhancement"]);
    let runner = Runner::new();
    let ctx = runner.context(Config::default());

    let data = pr_data(&mock, &ctx, MERGE_SHA).await.unwrap();

    assert_eq!(data.release_branch_sha, RELEASE_SHA);
    assert_eq!(data.current_version, Version::new(1, 8, 3));
    assert_eq!(data.new_version, Version::new(1, 9, 0));
    assert_eq!(data.bump, VersionBump::Minor);
    assert_eq!(data.label.as_deref(), Some("enhancement"));
    assert_eq!(data.pr_number, 101);
    assert_eq!(data.pr_url, "https://github.com/acme/notify-api/pull/101");
}

#[tokio::test]
async fn test_pr_data_uses_first_pull_request() {
    let mock = release_mock("1.0.0", &["bug"]);
    mock.add_pull_requests(
        MERGE_SHA,
        vec![pull_request(7, &["breaking-change"]), pull_request(8, &["bug"])],
    );
    let runner = Runner::new();
    let ctx = runner.context(Config::default());

    let data = pr_data(&mock, &ctx, MERGE_SHA).await.unwrap();
    assert_eq!(data.pr_number, 7);
    assert_eq!(data.new_version, Version::new(2, 0, 0));
}

#[tokio::test]
async fn test_pr_data_without_labels_is_minor() {
    let mock = release_mock("0.4.1", &[]);
    let runner = Runner::new();
    let ctx = runner.context(Config::default());

    let data = pr_data(&mock, &ctx, MERGE_SHA).await.unwrap();
    assert_eq!(data.new_version, Version::new(0, 5, 0));
    assert_eq!(data.label, None);
}

#[tokio::test]
async fn test_pr_data_without_pull_request_fails() {
    let mock = release_mock("1.0.0", &["bug"]);
    let runner = Runner::new();
    let ctx = runner.context(Config::default());

    let err = pr_data(&mock, &ctx, "unknown-sha").await.unwrap_err();
    assert!(matches!(err, ReleaseError::PullRequest(_)));
}

#[tokio::test]
async fn test_pr_data_with_malformed_variable_fails() {
    let mock = release_mock("release-one", &["bug"]);
    let runner = Runner::new();
    let ctx = runner.context(Config::default());

    let err = pr_data(&mock, &ctx, MERGE_SHA).await.unwrap_err();
    assert!(matches!(err, ReleaseError::Version(_)));
}

#[tokio::test]
async fn test_create_and_post_tag_with_out_of_range_version_fails() {
    let mock = release_mock("18446744073709551615.0.0", &["breaking-change"]);
    let runner = Runner::new();
    let ctx = runner.context(Config::default());

    let err = create_and_post_tag(&mock, &ctx, MERGE_SHA)
        .await
        .unwrap_err();
    assert!(matches!(err, ReleaseError::Version(_)));
    assert!(mock.calls().is_empty());
    assert!(runner.outputs().is_empty());
}

// ============================================================================
// create_and_post_tag
// ============================================================================

#[tokio::test]
async fn test_create_and_post_tag_patch_release() {
    let mock = release_mock("2.3.4", &["hotfix"]);
    let runner = Runner::new();
    let ctx = runner.context(Config::default());

    let result = create_and_post_tag(&mock, &ctx, MERGE_SHA).await.unwrap();

    assert_eq!(result.tag, "2.3.5");
    assert_eq!(result.previous_version, Version::new(2, 3, 4));
    assert!(result.created);

    assert_eq!(
        mock.calls(),
        vec![
            MockCall::CreateTagObject {
                tag: "2.3.5".to_string(),
                message: "Release for version 2.3.5".to_string(),
                commit_sha: RELEASE_SHA.to_string(),
            },
            MockCall::CreateRef {
                git_ref: "refs/tags/2.3.5".to_string(),
                sha: "tagobj-2.3.5".to_string(),
            },
            MockCall::UpdateVariable {
                name: "RELEASE_VERSION".to_string(),
                value: "2.3.5".to_string(),
            },
        ]
    );
    assert_eq!(mock.variable("RELEASE_VERSION").as_deref(), Some("2.3.5"));

    let outputs = runner.outputs();
    assert!(outputs.contains("previousVersion=2.3.4\n"));
    assert!(outputs.contains("newVersion=2.3.5\n"));
    assert!(outputs.contains("tag=2.3.5\n"));

    let summary = runner.summary();
    assert!(summary.contains("### Successful Tag Creation!"));
    assert!(summary.contains("- Previous version was 2.3.4"));
    assert!(summary.contains(RELEASE_SHA));
}

#[tokio::test]
async fn test_create_and_post_tag_with_custom_pattern_and_branch() {
    let mock = MockGitHub::new();
    mock.set_variable("APP_VERSION", "v0.9.0");
    mock.set_commit_ref("heads/main", "main-head");
    mock.add_pull_requests(MERGE_SHA, vec![pull_request(3, &["breaking-change"])]);

    let config = release_tagger::config::load_config(Some("tests/fixtures/release-tagger.toml"))
        .unwrap();
    let runner = Runner::new();
    let ctx = runner.context(config);

    let result = create_and_post_tag(&mock, &ctx, MERGE_SHA).await.unwrap();
    assert_eq!(result.tag, "v1.0.0");
    assert_eq!(result.release_branch_sha, "main-head");
    // the variable holds the bare version, the tag carries the prefix
    assert_eq!(mock.variable("APP_VERSION").as_deref(), Some("1.0.0"));
}

#[tokio::test]
async fn test_create_and_post_tag_dry_run_makes_no_changes() {
    let mock = release_mock("1.0.0", &["feature"]);
    let runner = Runner::new();
    let ctx = runner.context(Config::default()).with_dry_run(true);

    let result = create_and_post_tag(&mock, &ctx, MERGE_SHA).await.unwrap();

    assert_eq!(result.tag, "1.1.0");
    assert!(!result.created);
    assert!(mock.calls().is_empty());
    assert_eq!(mock.variable("RELEASE_VERSION").as_deref(), Some("1.0.0"));
    assert!(runner.summary().is_empty());
}

#[tokio::test]
async fn test_create_and_post_tag_stops_when_ref_fails() {
    let mock = release_mock("1.0.0", &["bug"]);
    mock.fail_on("create_ref");
    let runner = Runner::new();
    let ctx = runner.context(Config::default());

    let err = create_and_post_tag(&mock, &ctx, MERGE_SHA).await.unwrap_err();
    assert!(matches!(err, ReleaseError::Api { status: 500, .. }));

    // variable untouched and nothing reported
    assert_eq!(mock.variable("RELEASE_VERSION").as_deref(), Some("1.0.0"));
    assert!(runner.outputs().is_empty());
}

// ============================================================================
// create_release_notes
// ============================================================================

#[tokio::test]
async fn test_create_release_notes_draft() {
    let mock = MockGitHub::new();
    mock.set_variable("RELEASE_VERSION", "3.1.0");
    mock.set_release_notes("* Add bulk send by @dev in #88");
    let runner = Runner::new();
    let ctx = runner.context(Config::default());
    let today = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();

    let result = create_release_notes(&mock, &ctx, Some("3.0.2"), today)
        .await
        .unwrap();

    assert_eq!(result.tag, "3.1.0");
    assert_eq!(result.previous_tag.as_deref(), Some("3.0.2"));
    assert_eq!(result.title, "3.1.0 - 15 MAY 2024");
    let url = result.release_url.expect("release created");

    let calls = mock.calls();
    assert_eq!(calls.len(), 2);
    match &calls[0] {
        MockCall::GenerateNotes(request) => {
            assert_eq!(request.tag_name, "3.1.0");
            assert_eq!(request.previous_tag_name.as_deref(), Some("3.0.2"));
            assert_eq!(request.configuration_file_path, ".github/release.yaml");
        }
        other => panic!("unexpected call {:?}", other),
    }
    match &calls[1] {
        MockCall::CreateRelease(release) => {
            assert_eq!(release.name, "3.1.0 - 15 MAY 2024");
            assert_eq!(release.body, "* Add bulk send by @dev in #88");
            assert!(release.draft);
            assert!(!release.prerelease);
        }
        other => panic!("unexpected call {:?}", other),
    }

    assert!(runner.outputs().contains(&format!("releaseUrl={}", url)));
    let summary = runner.summary();
    assert!(summary.contains("### Release Notes Created!"));
    assert!(summary.contains(&url));
    assert!(summary.contains("previous version: 3.0.2"));
}

#[tokio::test]
async fn test_create_release_notes_without_previous_version() {
    let mock = MockGitHub::new();
    mock.set_variable("RELEASE_VERSION", "0.1.0");
    let runner = Runner::new();
    let ctx = runner.context(Config::default());
    let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

    let result = create_release_notes(&mock, &ctx, None, today).await.unwrap();
    assert_eq!(result.previous_tag, None);
    assert!(result.release_url.is_some());
}

#[tokio::test]
async fn test_create_release_notes_rejects_bad_previous_version() {
    let mock = MockGitHub::new();
    mock.set_variable("RELEASE_VERSION", "1.0.0");
    let runner = Runner::new();
    let ctx = runner.context(Config::default());
    let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

    let err = create_release_notes(&mock, &ctx, Some("latest"), today)
        .await
        .unwrap_err();
    assert!(matches!(err, ReleaseError::Version(_)));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn test_create_release_notes_accepts_previous_tag() {
    let mock = MockGitHub::new();
    mock.set_variable("RELEASE_VERSION", "1.5.0");
    let runner = Runner::new();
    let mut config = Config::default();
    config.release.tag_pattern = "release-{version}".to_string();
    let ctx = runner.context(config);
    let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

    let from_tag = create_release_notes(&mock, &ctx, Some("release-1.4.0"), today)
        .await
        .unwrap();
    assert_eq!(from_tag.tag, "release-1.5.0");
    assert_eq!(from_tag.previous_tag.as_deref(), Some("release-1.4.0"));

    let from_version = create_release_notes(&mock, &ctx, Some("1.4.0"), today)
        .await
        .unwrap();
    assert_eq!(from_version.previous_tag.as_deref(), Some("release-1.4.0"));
}

#[tokio::test]
async fn test_create_release_notes_dry_run() {
    let mock = MockGitHub::new();
    mock.set_variable("RELEASE_VERSION", "1.2.0");
    let runner = Runner::new();
    let ctx = runner.context(Config::default()).with_dry_run(true);
    let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

    let result = create_release_notes(&mock, &ctx, Some("1.1.0"), today)
        .await
        .unwrap();
    assert_eq!(result.release_url, None);
    assert!(!mock
        .calls()
        .iter()
        .any(|c| matches!(c, MockCall::CreateRelease(_))));
    assert!(runner.summary().is_empty());
}

#[tokio::test]
async fn test_create_release_notes_propagates_generation_failure() {
    let mock = MockGitHub::new();
    mock.set_variable("RELEASE_VERSION", "1.2.0");
    mock.fail_on("generate_release_notes");
    let runner = Runner::new();
    let ctx = runner.context(Config::default());
    let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

    assert!(create_release_notes(&mock, &ctx, Some("1.1.0"), today)
        .await
        .is_err());
    assert!(runner.summary().is_empty());
}

// ============================================================================
// trigger_regression
// ============================================================================

fn run(id: u64, status: &str, conclusion: Option<&str>) -> WorkflowRun {
    WorkflowRun {
        id,
        status: Some(status.to_string()),
        conclusion: conclusion.map(str::to_string),
        html_url: format!("https://github.com/acme/notify-qa/actions/runs/{}", id),
    }
}

fn regression_config() -> Config {
    let mut config = Config::default();
    config.regression.owner = Some("acme".to_string());
    config.regression.repo = Some("notify-qa".to_string());
    config
}

#[tokio::test(start_paused = true)]
async fn test_trigger_regression_success() {
    let mock = MockGitHub::new();
    mock.push_run_listing(vec![]);
    mock.push_run_listing(vec![run(55, "queued", None)]);
    mock.push_run_state(run(55, "in_progress", None));
    mock.push_run_state(run(55, "completed", Some("success")));
    mock.set_jobs(vec![Job {
        id: 9,
        name: "Test in staging".to_string(),
        conclusion: Some("success".to_string()),
    }]);
    mock.set_job_logs(9, "all green");
    let runner = Runner::new();
    let ctx = runner.context(regression_config());

    let result = trigger_regression(&mock, &ctx, "staging")
        .await
        .unwrap()
        .expect("not a dry run");

    assert_eq!(result.run_id, 55);
    assert!(result.passed());
    assert!(result.job_found);

    match &mock.calls()[0] {
        MockCall::DispatchWorkflow {
            repo,
            workflow,
            git_ref,
            inputs,
        } => {
            assert_eq!(repo, &RepoContext::new("acme", "notify-qa"));
            assert_eq!(workflow, "regression.yml");
            assert_eq!(git_ref, "master");
            assert_eq!(inputs.get("environment").map(String::as_str), Some("staging"));
        }
        other => panic!("unexpected call {:?}", other),
    }

    assert!(runner.outputs().contains(
        "regression_result=QA Regression result is passed; link to this run is https://github.com/acme/notify-qa/actions/runs/55"
    ));
    assert!(runner.summary().contains("Result: passed"));
}

#[tokio::test(start_paused = true)]
async fn test_trigger_regression_failure_is_error() {
    let mock = MockGitHub::new();
    mock.push_run_listing(vec![run(56, "queued", None)]);
    mock.push_run_state(run(56, "completed", Some("failure")));
    mock.set_jobs(vec![Job {
        id: 10,
        name: "Test in dev".to_string(),
        conclusion: Some("failure".to_string()),
    }]);
    let runner = Runner::new();
    let ctx = runner.context(regression_config());

    let err = trigger_regression(&mock, &ctx, "dev").await.unwrap_err();
    match err {
        ReleaseError::WorkflowFailed { conclusion, url } => {
            assert_eq!(conclusion, "failure");
            assert!(url.ends_with("/actions/runs/56"));
        }
        other => panic!("unexpected error {:?}", other),
    }
    // the result is still reported before failing; missing logs are not fatal
    assert!(runner.summary().contains("Result: failed"));
}

#[tokio::test(start_paused = true)]
async fn test_trigger_regression_missing_job_is_warning() {
    let mock = MockGitHub::new();
    mock.push_run_listing(vec![run(57, "queued", None)]);
    mock.push_run_state(run(57, "completed", Some("failure")));
    mock.set_jobs(vec![Job {
        id: 11,
        name: "Test in prod".to_string(),
        conclusion: None,
    }]);
    let runner = Runner::new();
    let ctx = runner.context(regression_config());

    let result = trigger_regression(&mock, &ctx, "perf")
        .await
        .unwrap()
        .unwrap();
    assert!(!result.job_found);
    assert!(runner.outputs().is_empty());
    assert!(runner.summary().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_trigger_regression_times_out() {
    let mock = MockGitHub::new();
    mock.push_run_listing(vec![run(58, "queued", None)]);
    mock.push_run_state(run(58, "in_progress", None));
    let mut config = regression_config();
    config.regression.timeout_secs = 120;
    let runner = Runner::new();
    let ctx = runner.context(config);

    let err = trigger_regression(&mock, &ctx, "staging").await.unwrap_err();
    assert!(matches!(err, ReleaseError::Timeout { .. }));
}

#[tokio::test]
async fn test_trigger_regression_dry_run() {
    let mock = MockGitHub::new();
    let runner = Runner::new();
    let ctx = runner.context(regression_config()).with_dry_run(true);

    let result = trigger_regression(&mock, &ctx, "staging").await.unwrap();
    assert_eq!(result, None);
    assert!(mock.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_trigger_regression_defaults_to_current_repository() {
    let mock = MockGitHub::new();
    mock.push_run_listing(vec![run(60, "completed", Some("success"))]);
    mock.push_run_state(run(60, "completed", Some("success")));
    mock.set_jobs(vec![Job {
        id: 12,
        name: "Test in staging".to_string(),
        conclusion: Some("success".to_string()),
    }]);
    let runner = Runner::new();
    let ctx = runner.context(Config::default());

    trigger_regression(&mock, &ctx, "staging").await.unwrap();
    match &mock.calls()[0] {
        MockCall::DispatchWorkflow { repo, .. } => {
            assert_eq!(repo, &RepoContext::new("acme", "notify-api"));
        }
        other => panic!("unexpected call {:?}", other),
    }
}
