pub mod document_store;
pub mod monitor_task;
pub mod plan_analyzer;
pub mod report;
pub mod sender;
pub mod source;

pub use document_store::{DocumentSink, FileDocumentStore, InMemoryDocumentStore, StoreError};
pub use monitor_task::{MonitorTask, start_monitor_task};
pub use plan_analyzer::{PlanAnalysis, analyze_plan};
pub use report::{Report, ReportBuilder, ReportError};
pub use sender::{ConsoleSender, ReportSender, SendError};
pub use source::{DiagnosticSource, JsonSnapshotSource, SourceError};
