//! Analysis logic - pull request label classification

pub mod label_analyzer;

pub use label_analyzer::{BumpDecision, LabelAnalyzer};
