use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFile {
    pub name: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

impl StoredFile {
    pub fn size_label(&self) -> String {
        let size = self.size as f64;
        if size < 1024.0 {
            format!("{} B", self.size)
        } else if size < 1024.0 * 1024.0 {
            format!("{:.1} KB", size / 1024.0)
        } else {
            format!("{:.1} MB", size / (1024.0 * 1024.0))
        }
    }
}

/// Result of an upload attempt. Only `Stored` writes to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Stored(String),
    MissingPart,
    EmptyFilename,
    DisallowedType(String),
    InvalidFilename(String),
}

impl UploadOutcome {
    pub fn message(&self) -> String {
        match self {
            UploadOutcome::Stored(name) => format!("File uploaded successfully as {}", name),
            UploadOutcome::MissingPart => "No file part".to_string(),
            UploadOutcome::EmptyFilename => "No file selected".to_string(),
            UploadOutcome::DisallowedType(name) => format!("File type not allowed: {}", name),
            UploadOutcome::InvalidFilename(name) => format!("Invalid filename: {}", name),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileHealth {
    pub status: String,
    pub visits: usize,
    pub files: usize,
    pub visits_file_exists: bool,
}
