//! Diagnostic data sources
//!
//! A source yields the three DMV result sets of one monitoring cycle.
//! `JsonSnapshotSource` reads them from JSON exports on disk, one array of
//! rows per file.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::DiagnosticSnapshot;

pub const LONG_RUNNING_QUERIES_FILE: &str = "long_running_queries.json";
pub const MISSING_INDEXES_FILE: &str = "missing_indexes.json";
pub const BAD_QUERIES_FILE: &str = "bad_queries.json";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed snapshot file {file}: {source}")]
    Json {
        file: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Supplier of diagnostic result sets
#[async_trait]
pub trait DiagnosticSource: Send + Sync {
    /// Fetch all three result sets. A failure skips the cycle.
    async fn fetch(&self) -> Result<DiagnosticSnapshot, SourceError>;
}

/// Reads result sets exported as JSON arrays from a snapshot directory
pub struct JsonSnapshotSource {
    dir: PathBuf,
}

impl JsonSnapshotSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Rows of one file; a missing file is an empty result set
    async fn read_rows<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, SourceError> {
        let path = self.dir.join(file);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("Snapshot file {} not found, treating as empty", path.display());
                return Ok(Vec::new());
            },
            Err(e) => return Err(SourceError::Io(e)),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content)
            .map_err(|source| SourceError::Json { file: file.to_string(), source })
    }
}

#[async_trait]
impl DiagnosticSource for JsonSnapshotSource {
    async fn fetch(&self) -> Result<DiagnosticSnapshot, SourceError> {
        let snapshot = DiagnosticSnapshot {
            long_running_queries: self.read_rows(LONG_RUNNING_QUERIES_FILE).await?,
            missing_indexes: self.read_rows(MISSING_INDEXES_FILE).await?,
            bad_queries: self.read_rows(BAD_QUERIES_FILE).await?,
        };

        tracing::debug!(
            "Loaded snapshot from {}: {} long running, {} missing indexes, {} bad queries",
            self.dir.display(),
            snapshot.long_running_queries.len(),
            snapshot.missing_indexes.len(),
            snapshot.bad_queries.len()
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportType;
    use crate::services::report::format_narrative;
    use crate::services::report::narrative::NO_PLAN_FOUND;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sqlmon-source-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_missing_files_are_empty() {
        let dir = temp_dir();
        let snapshot = JsonSnapshotSource::new(&dir).fetch().await.unwrap();
        assert_eq!(snapshot, DiagnosticSnapshot::default());
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_reads_exported_rows() {
        let dir = temp_dir();
        std::fs::write(
            dir.join(MISSING_INDEXES_FILE),
            r#"[{
                "DatabaseId": 5,
                "ObjectId": 901578250,
                "FullyQualifiedTableName": "[Sales].[dbo].[Orders]",
                "EqualityColumns": null,
                "InequalityColumns": "[Total]",
                "IncludedColumns": null,
                "AvgTotalUserCost": 42.5,
                "CreateStatement": "CREATE INDEX [IX_Orders_Total] ON [Sales].[dbo].[Orders] ([Total])"
            }]"#,
        )
        .unwrap();
        std::fs::write(
            dir.join(BAD_QUERIES_FILE),
            r#"[{"TotalCpuTime": 1800, "ExecutionCount": 2, "AvgCpuTime": 900, "SqlText": "SELECT 1", "QueryPlan": ""}]"#,
        )
        .unwrap();

        let snapshot = JsonSnapshotSource::new(&dir).fetch().await.unwrap();
        assert!(snapshot.long_running_queries.is_empty());
        assert_eq!(snapshot.missing_indexes.len(), 1);
        assert_eq!(snapshot.missing_indexes[0].avg_total_user_cost, 42.5);
        assert_eq!(snapshot.bad_queries[0].execution_count, 2);
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_null_query_plan_is_no_plan() {
        let dir = temp_dir();
        std::fs::write(
            dir.join(BAD_QUERIES_FILE),
            r#"[
                {"TotalCpuTime": 1800, "ExecutionCount": 2, "AvgCpuTime": 900,
                 "SqlText": "SELECT 1", "QueryPlan": null},
                {"TotalCpuTime": 50, "ExecutionCount": 1, "AvgCpuTime": 50,
                 "SqlText": null, "QueryPlan": null}
            ]"#,
        )
        .unwrap();

        let snapshot = JsonSnapshotSource::new(&dir).fetch().await.unwrap();
        assert_eq!(snapshot.bad_queries.len(), 2);
        assert!(snapshot.bad_queries[0].query_plan.is_empty());
        assert!(snapshot.bad_queries[1].sql_text.is_empty());

        let narrative = format_narrative(&snapshot.records_for(ReportType::BadQuery));
        let lines: Vec<&str> = narrative.lines().collect();
        assert_eq!(lines[0], "Found 2 bad queries.");
        assert_eq!(lines[2], NO_PLAN_FOUND);
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_malformed_file_fails_fetch() {
        let dir = temp_dir();
        std::fs::write(dir.join(BAD_QUERIES_FILE), "{ not json").unwrap();

        let err = JsonSnapshotSource::new(&dir).fetch().await.unwrap_err();
        match err {
            SourceError::Json { file, .. } => assert_eq!(file, BAD_QUERIES_FILE),
            other => panic!("unexpected error: {}", other),
        }
        std::fs::remove_dir_all(dir).ok();
    }
}
