//! Workflow entry points invoked by the CLI subcommands

pub mod orchestration;
pub mod regression;
pub mod release_notes;

pub use orchestration::{create_and_post_tag, pr_data, PrData, TagResult, WorkflowContext};
pub use regression::{trigger_regression, RegressionResult};
pub use release_notes::{create_release_notes, NotesResult};
