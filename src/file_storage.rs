use crate::file_models::{StoredFile, UploadOutcome};
use crate::upload::{allowed_file, sanitize_filename, timestamped_name};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Flat-file visit log plus an upload directory, both on the storage volume.
#[derive(Debug, Clone)]
pub struct FileStore {
    visits_file: PathBuf,
    upload_dir: PathBuf,
}

impl FileStore {
    pub fn new(visits_file: impl Into<PathBuf>, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            visits_file: visits_file.into(),
            upload_dir: upload_dir.into(),
        }
    }

    pub fn visits_file(&self) -> &Path {
        &self.visits_file
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn visits_file_exists(&self) -> bool {
        self.visits_file.exists()
    }

    pub fn upload_dir_exists(&self) -> bool {
        self.upload_dir.is_dir()
    }

    /// Appends one RFC 3339 timestamp line. Concurrent appenders are not
    /// serialized, so interleaved writes are possible under load.
    pub async fn record_visit(&self) -> Result<DateTime<Utc>> {
        let now = Utc::now();
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.visits_file)
            .await
            .with_context(|| format!("Failed to open visit log: {}", self.visits_file.display()))?;

        file.write_all(format!("{}\n", now.to_rfc3339()).as_bytes())
            .await
            .context("Failed to append to visit log")?;
        file.flush().await.context("Failed to flush visit log")?;

        Ok(now)
    }

    async fn read_visit_lines(&self) -> Result<Vec<String>> {
        match tokio::fs::read_to_string(&self.visits_file).await {
            Ok(data) => Ok(data
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read visit log: {}", self.visits_file.display())),
        }
    }

    /// A log that does not exist yet counts as zero visits.
    pub async fn count_visits(&self) -> Result<usize> {
        Ok(self.read_visit_lines().await?.len())
    }

    /// Last `limit` timestamps, newest first.
    pub async fn recent_visits(&self, limit: usize) -> Result<Vec<String>> {
        let lines = self.read_visit_lines().await?;
        Ok(lines.into_iter().rev().take(limit).collect())
    }

    /// Regular files in the upload directory, newest name first. The
    /// timestamp prefix makes name order match upload order.
    pub async fn list_files(&self) -> Result<Vec<StoredFile>> {
        let mut entries = match tokio::fs::read_dir(&self.upload_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read upload directory: {}", self.upload_dir.display())
                })
            }
        };

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .context("Failed to read upload directory entry")?
        {
            let meta = entry
                .metadata()
                .await
                .context("Failed to stat uploaded file")?;
            if !meta.is_file() {
                continue;
            }
            files.push(StoredFile {
                name: entry.file_name().to_string_lossy().to_string(),
                size: meta.len(),
                modified: meta.modified().ok().map(DateTime::<Utc>::from),
            });
        }

        files.sort_by(|a, b| b.name.cmp(&a.name));
        Ok(files)
    }

    pub async fn count_files(&self) -> Result<usize> {
        Ok(self.list_files().await?.len())
    }

    /// Validates the client filename and, if acceptable, writes `data` under a
    /// sanitized, timestamp-prefixed name. Rejections leave the disk untouched.
    pub async fn save_upload(&self, filename: &str, data: &[u8]) -> Result<UploadOutcome> {
        if filename.is_empty() {
            return Ok(UploadOutcome::EmptyFilename);
        }
        if !allowed_file(filename) {
            return Ok(UploadOutcome::DisallowedType(filename.to_string()));
        }

        let sanitized = sanitize_filename(filename);
        if !allowed_file(&sanitized) {
            return Ok(UploadOutcome::InvalidFilename(filename.to_string()));
        }

        let stored = timestamped_name(&sanitized, Utc::now());
        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .with_context(|| {
                format!("Failed to create upload directory: {}", self.upload_dir.display())
            })?;

        let target = self.upload_dir.join(&stored);
        tokio::fs::write(&target, data)
            .await
            .with_context(|| format!("Failed to write upload: {}", target.display()))?;

        Ok(UploadOutcome::Stored(stored))
    }
}
