//! Domain logic - pure release rules independent of the GitHub API

pub mod branch;
pub mod release;
pub mod tag;
pub mod version;

pub use branch::ReleaseBranch;
pub use release::{format_release_date, release_title};
pub use tag::{tag_message, tag_ref, TagPattern};
pub use version::{Version, VersionBump};
