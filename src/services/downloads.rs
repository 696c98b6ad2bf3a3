//! Saving generated synopsis documents.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::info;

use crate::domain::{OutputFormat, SavedDocument};
use crate::error::ClientResult;

/// Destination for downloaded documents.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    async fn save(&self, file_name: &str, body: &[u8]) -> ClientResult<SavedDocument>;
}

/// Writes documents into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DownloadDir {
    root: PathBuf,
}

impl DownloadDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DocumentSink for DownloadDir {
    async fn save(&self, file_name: &str, body: &[u8]) -> ClientResult<SavedDocument> {
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.root.join(file_name);
        tokio::fs::write(&path, body).await?;

        info!(path = %path.display(), bytes = body.len(), "Synopsis saved");

        Ok(SavedDocument {
            path,
            bytes: body.len(),
        })
    }
}

/// `synopsis_{inn}_{epoch-millis}.{format}`.
///
/// Whitespace and path separators in the INN become underscores so the
/// name stays a single path component.
pub fn synopsis_file_name(inn: &str, at: DateTime<Utc>, format: OutputFormat) -> String {
    let inn: String = inn
        .trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() || matches!(c, '/' | '\\' | ':') {
                '_'
            } else {
                c
            }
        })
        .collect();
    let inn = if inn.is_empty() { "unknown".to_string() } else { inn };

    format!(
        "synopsis_{}_{}.{}",
        inn,
        at.timestamp_millis(),
        format.extension()
    )
}
