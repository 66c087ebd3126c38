//! Report delivery

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum SendError {
    #[error("Failed to deliver report: {0}")]
    Io(#[from] std::io::Error),
}

/// Receiver of the finished report text
#[async_trait]
pub trait ReportSender: Send + Sync {
    async fn send(&self, report: &str) -> Result<(), SendError>;
}

/// Writes reports to stdout, or to any async writer
pub struct ConsoleSender<W = tokio::io::Stdout> {
    out: Mutex<W>,
}

impl ConsoleSender {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> ConsoleSender<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W> ReportSender for ConsoleSender<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn send(&self, report: &str) -> Result<(), SendError> {
        let mut out = self.out.lock().await;
        out.write_all(report.as_bytes()).await?;
        if !report.ends_with('\n') {
            out.write_all(b"\n").await?;
        }
        out.flush().await?;
        Ok(())
    }
}
