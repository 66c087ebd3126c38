//! Diagnostic Report Task
//!
//! Scheduled task that produces one diagnostic report per cycle.
//! Uses the ScheduledExecutor framework for periodic execution.

use anyhow::Context;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::models::ReportType;
use crate::services::document_store::DocumentSink;
use crate::services::report::{Report, ReportBuilder};
use crate::services::sender::ReportSender;
use crate::services::source::DiagnosticSource;
use crate::utils::scheduled_executor::{ScheduledExecutor, ScheduledTask};

pub const MONITOR_TASK_NAME: &str = "diagnostic-report";

/// One reporting cycle:
/// 1. Fetch the diagnostic snapshot (a failed fetch skips the cycle)
/// 2. Build the narrative report for the configured categories
/// 3. Send the report text
/// 4. Persist one document per category
pub struct MonitorTask {
    source: Arc<dyn DiagnosticSource>,
    store: Arc<dyn DocumentSink>,
    sender: Arc<dyn ReportSender>,
    categories: Vec<ReportType>,
    shutdown: Arc<AtomicBool>,
}

impl MonitorTask {
    pub fn new(
        source: Arc<dyn DiagnosticSource>,
        store: Arc<dyn DocumentSink>,
        sender: Arc<dyn ReportSender>,
        categories: Vec<ReportType>,
    ) -> Self {
        Self { source, store, sender, categories, shutdown: Arc::new(AtomicBool::new(false)) }
    }

    /// Get shutdown handle
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// Run one full cycle and return the report that was sent
    pub async fn run_cycle(&self) -> Result<Report, anyhow::Error> {
        info!("Starting diagnostic report cycle ({} categories)", self.categories.len());

        let snapshot = self
            .source
            .fetch()
            .await
            .context("Failed to fetch diagnostic snapshot, skipping cycle")?;

        for &report_type in &self.categories {
            match self.store.latest(report_type).await {
                Ok(Some(previous)) => debug!(
                    "Previous {} report: {} at {}",
                    report_type, previous.id, previous.created_at
                ),
                Ok(None) => debug!("No previous {} report", report_type),
                Err(e) => warn!("Failed to look up previous {} report: {}", report_type, e),
            }
        }

        let mut builder = ReportBuilder::new();
        builder.add_snapshot(&snapshot, &self.categories)?;
        let report = builder.build();

        self.sender.send(&report.text).await.context("Failed to send report")?;

        let mut stored = 0;
        for document in &report.documents {
            self.store
                .insert(document)
                .await
                .with_context(|| {
                    format!("Failed to store {} document {}", document.report_type, document.id)
                })?;
            stored += 1;
        }

        info!("Diagnostic report cycle completed: {} documents stored", stored);
        Ok(report)
    }
}

impl ScheduledTask for MonitorTask {
    fn run(&self) -> Pin<Box<dyn Future<Output = Result<(), anyhow::Error>> + Send + '_>> {
        Box::pin(async move { self.run_cycle().await.map(|_| ()) })
    }

    fn should_terminate(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

/// Spawn the task on a `ScheduledExecutor`
///
/// Returns the task's shutdown handle and the join handle of the loop.
pub fn start_monitor_task(
    task: MonitorTask,
    interval_secs: u64,
    run_on_startup: bool,
) -> (Arc<AtomicBool>, tokio::task::JoinHandle<()>) {
    let shutdown_handle = task.shutdown_handle();
    let executor = ScheduledExecutor::new(MONITOR_TASK_NAME, Duration::from_secs(interval_secs))
        .with_run_on_startup(run_on_startup);

    let join = tokio::spawn(async move {
        executor.start(task).await;
    });

    info!("Diagnostic report task started with interval: {}s", interval_secs);

    (shutdown_handle, join)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BadQueryInfo, DiagnosticSnapshot, MissingIndexInfo};
    use crate::services::document_store::InMemoryDocumentStore;
    use crate::services::sender::SendError;
    use crate::services::source::SourceError;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    struct FixedSource(Option<DiagnosticSnapshot>);

    #[async_trait]
    impl DiagnosticSource for FixedSource {
        async fn fetch(&self) -> Result<DiagnosticSnapshot, SourceError> {
            self.0
                .clone()
                .ok_or_else(|| SourceError::Io(std::io::Error::other("server unreachable")))
        }
    }

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ReportSender for RecordingSender {
        async fn send(&self, report: &str) -> Result<(), SendError> {
            self.sent.lock().await.push(report.to_string());
            Ok(())
        }
    }

    fn snapshot() -> DiagnosticSnapshot {
        DiagnosticSnapshot {
            long_running_queries: vec![],
            missing_indexes: vec![MissingIndexInfo {
                database_id: 5,
                object_id: 7,
                fully_qualified_table_name: "[Sales].[dbo].[Orders]".into(),
                equality_columns: Some("[CustomerId]".into()),
                inequality_columns: None,
                included_columns: None,
                avg_total_user_cost: 12.0,
                create_statement: "CREATE INDEX [IX_Orders_CustomerId] ON [Sales].[dbo].[Orders] ([CustomerId])".into(),
            }],
            bad_queries: vec![BadQueryInfo {
                total_cpu_time: 100,
                execution_count: 10,
                avg_cpu_time: 10,
                sql_text: "SELECT 1".into(),
                query_plan: String::new(),
            }],
        }
    }

    #[tokio::test]
    async fn test_cycle_sends_and_stores() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let sender = Arc::new(RecordingSender::default());
        let task = MonitorTask::new(
            Arc::new(FixedSource(Some(snapshot()))),
            store.clone(),
            sender.clone(),
            ReportType::ALL.to_vec(),
        );

        let report = task.run_cycle().await.unwrap();

        let sent = sender.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], report.text);
        assert!(sent[0].contains("Found 1 missing index."));
        assert!(sent[0].contains("No long running queries found."));

        let documents = store.documents().await;
        assert_eq!(documents.len(), 3);
        assert_eq!(store.latest(ReportType::BadQuery).await.unwrap(), Some(documents[2].clone()));
    }

    #[tokio::test]
    async fn test_configured_categories_only() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let task = MonitorTask::new(
            Arc::new(FixedSource(Some(snapshot()))),
            store.clone(),
            Arc::new(RecordingSender::default()),
            vec![ReportType::BadQuery],
        );

        let report = task.run_cycle().await.unwrap();
        assert!(report.text.starts_with("Found 1 Top bad queries.\n"));
        assert_eq!(store.documents().await.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_skips_cycle() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let sender = Arc::new(RecordingSender::default());
        let task = MonitorTask::new(
            Arc::new(FixedSource(None)),
            store.clone(),
            sender.clone(),
            ReportType::ALL.to_vec(),
        );

        assert!(task.run_cycle().await.is_err());
        assert!(sender.sent.lock().await.is_empty());
        assert!(store.documents().await.is_empty());
    }

    #[tokio::test]
    async fn test_scheduled_until_shutdown() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let task = MonitorTask::new(
            Arc::new(FixedSource(Some(DiagnosticSnapshot::default()))),
            store.clone(),
            Arc::new(RecordingSender::default()),
            ReportType::ALL.to_vec(),
        );

        let (shutdown, join) = start_monitor_task(task, 3600, true);
        while store.documents().await.is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        shutdown.store(true, Ordering::Relaxed);
        tokio::time::timeout(Duration::from_secs(5), join).await.unwrap().unwrap();

        assert_eq!(store.documents().await.len(), 3);
    }
}
