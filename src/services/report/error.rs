//! Report error types

use thiserror::Error;

use crate::models::ReportType;

/// Contract violations while assembling a report.
///
/// Any of these aborts the cycle: no partial report is produced.
#[derive(Debug, Error, PartialEq)]
pub enum ReportError {
    #[error("Records of category {found} were added as {expected}")]
    CategoryMismatch { expected: ReportType, found: ReportType },

    #[error("Category {0} was already added to this report")]
    DuplicateCategory(ReportType),
}

/// Result type alias for report operations
pub type ReportResult<T> = Result<T, ReportError>;
