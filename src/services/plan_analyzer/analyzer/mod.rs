//! Plan analyzer module
//!
//! Cost-based classification of parsed plan records.

pub mod cost_classifier;

pub use cost_classifier::CostClassifier;
