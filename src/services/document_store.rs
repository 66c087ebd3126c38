//! Report document persistence
//!
//! Documents are keyed by id and creation time. `latest` returns the newest
//! document of a category; nothing compares reports against it yet.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::{ReportDocument, ReportType};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document (de)serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait]
pub trait DocumentSink: Send + Sync {
    async fn insert(&self, document: &ReportDocument) -> Result<(), StoreError>;

    /// Newest document of a category, if any was stored
    async fn latest(&self, report_type: ReportType) -> Result<Option<ReportDocument>, StoreError>;
}

// ============================================================================
// File store
// ============================================================================

/// One pretty-printed JSON file per document:
/// `{root}/{report_type}/{created_at_millis}-{id}.json`
pub struct FileDocumentStore {
    root: PathBuf,
}

impl FileDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document_path(&self, document: &ReportDocument) -> PathBuf {
        self.root.join(document.report_type.as_str()).join(format!(
            "{}-{}.json",
            document.created_at.timestamp_millis(),
            document.id
        ))
    }

    /// Creation millis encoded in a document file name
    fn file_millis(path: &Path) -> Option<i64> {
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        let (millis, _id) = stem.split_once('-')?;
        millis.parse().ok()
    }
}

#[async_trait]
impl DocumentSink for FileDocumentStore {
    async fn insert(&self, document: &ReportDocument) -> Result<(), StoreError> {
        let path = self.document_path(document);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let body = serde_json::to_vec_pretty(document)?;
        tokio::fs::write(&path, body).await?;

        tracing::debug!(
            "Stored {} document {} at {}",
            document.report_type,
            document.id,
            path.display()
        );
        Ok(())
    }

    async fn latest(&self, report_type: ReportType) -> Result<Option<ReportDocument>, StoreError> {
        let dir = self.root.join(report_type.as_str());
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        // Same-millisecond documents are ordered by file name, i.e. by id
        let mut newest: Option<(i64, PathBuf)> = None;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(millis) = Self::file_millis(&path) else {
                continue;
            };
            if newest
                .as_ref()
                .is_none_or(|(best, best_path)| (millis, &path) > (*best, best_path))
            {
                newest = Some((millis, path));
            }
        }

        match newest {
            Some((_, path)) => {
                let content = tokio::fs::read(&path).await?;
                Ok(Some(serde_json::from_slice(&content)?))
            },
            None => Ok(None),
        }
    }
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<Vec<ReportDocument>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything stored so far, in insertion order
    pub async fn documents(&self) -> Vec<ReportDocument> {
        self.documents.read().await.clone()
    }
}

#[async_trait]
impl DocumentSink for InMemoryDocumentStore {
    async fn insert(&self, document: &ReportDocument) -> Result<(), StoreError> {
        self.documents.write().await.push(document.clone());
        Ok(())
    }

    async fn latest(&self, report_type: ReportType) -> Result<Option<ReportDocument>, StoreError> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter(|d| d.report_type == report_type)
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)))
            .cloned())
    }
}
