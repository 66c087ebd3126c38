//! Plan parser module
//!
//! Provides parsing capabilities for SQL Server showplan XML.

pub mod composer;
pub mod core;
pub mod error;

// Re-export commonly used items
pub use composer::{ParsedPlan, PlanComposer};
pub use error::{ParseError, ParseResult};
