use anyhow::Context;
use axum::body::Bytes;
use futures::{Stream, StreamExt};
use service_core::error::AppError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub const PDF_DIR: &str = "pdfs";
pub const DOCX_DIR: &str = "docx";

/// Filesystem layout under the media root:
/// `<root>/pdfs/<name>.pdf` and `<root>/docx/<name>.docx`.
///
/// Names are used as given, so a second upload with the same name
/// replaces the first.
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn pdf_dir(&self) -> PathBuf {
        self.root.join(PDF_DIR)
    }

    pub fn docx_dir(&self) -> PathBuf {
        self.root.join(DOCX_DIR)
    }

    pub fn pdf_path(&self, file_name: &str) -> PathBuf {
        self.pdf_dir().join(file_name)
    }

    pub fn docx_path(&self, file_name: &str) -> PathBuf {
        self.docx_dir().join(file_name)
    }

    /// Creates both media directories; existing ones are left alone.
    pub async fn ensure_dirs(&self) -> Result<(), AppError> {
        for dir in [self.pdf_dir(), self.docx_dir()] {
            fs::create_dir_all(&dir)
                .await
                .with_context(|| format!("Failed to create directory {}", dir.display()))
                .map_err(AppError::StorageError)?;
        }
        Ok(())
    }

    /// Writes `stream` to `path` chunk by chunk, truncating any previous
    /// file. Returns the number of bytes written.
    pub async fn write_stream<S, E>(&self, path: &Path, stream: S) -> Result<u64, AppError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let mut stream = std::pin::pin!(stream);
        let mut file = fs::File::create(path)
            .await
            .with_context(|| format!("Failed to create {}", path.display()))
            .map_err(AppError::StorageError)?;

        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .context("Failed to read upload stream")
                .map_err(AppError::StorageError)?;
            file.write_all(&chunk)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))
                .map_err(AppError::StorageError)?;
            written += chunk.len() as u64;
        }

        file.flush()
            .await
            .with_context(|| format!("Failed to flush {}", path.display()))
            .map_err(AppError::StorageError)?;

        Ok(written)
    }
}
