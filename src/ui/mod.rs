//! User interface module - console formatting and job-summary markdown.
//!
//! Separates concerns:
//! - `formatter` - Status lines printed to the workflow log
//! - `summary` - Markdown appended to the job summary

pub mod formatter;
pub mod summary;

// Re-export formatter functions for convenience
pub use formatter::{
    display_boundary_warning, display_decision, display_status, display_success, format_decision,
};
