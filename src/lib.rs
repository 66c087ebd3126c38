//! sqlmon Library
//!
//! Diagnostic report engine for SQL Server: parses cached query plans,
//! ranks DMV findings and renders them into a narrative text report.

pub mod config;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use models::{DiagnosticRecords, DiagnosticSnapshot, ReportDocument, ReportType};
pub use services::{
    ConsoleSender, DiagnosticSource, DocumentSink, FileDocumentStore, JsonSnapshotSource,
    MonitorTask, ReportBuilder, ReportSender,
};
