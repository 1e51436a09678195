pub mod actions;
pub mod analyzer;
pub mod boundary;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod github;
pub mod poll;
pub mod ui;

pub use error::{ReleaseError, Result};
