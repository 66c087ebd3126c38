//! Diagnostic report generation
//!
//! Turns the three diagnostic result sets of a cycle into a narrative text
//! report and one [`ReportDocument`](crate::models::ReportDocument) per
//! category.
//!
//! # Usage
//!
//! ```ignore
//! use sqlmon::services::report::ReportBuilder;
//!
//! let mut builder = ReportBuilder::new();
//! builder.add_snapshot(&snapshot, &ReportType::ALL)?;
//! let report = builder.build();
//! println!("{}", report.text);
//! ```

pub mod builder;
pub mod error;
pub mod narrative;


pub use builder::{Report, ReportBuilder, section_header};
pub use error::{ReportError, ReportResult};
pub use narrative::{MetricDescriptor, format_narrative};
