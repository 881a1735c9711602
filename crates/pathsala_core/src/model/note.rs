//! Study note record.
//!
//! # Invariants
//! - `subject_id` is fixed at upload time; the client never reclassifies a note.
//! - `file_type()` is derived from the `file_url` extension, never stored.

use super::academic::SubjectId;
use super::{require_text, CatalogRecord, ModelValidationError};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static FILE_EXTENSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.([A-Za-z0-9]{1,8})(?:[?#].*)?$").expect("valid file extension regex")
});

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Stable note identifier as issued by the catalog.
pub type NoteId = String;

/// Server-side processing state of an uploaded note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteStatus {
    /// Text extraction / summarization still running.
    Processing,
    /// Available for viewing and chat.
    Ready,
}

/// File category used by the file-type refinement filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Pdf,
    Image,
}

impl FileType {
    /// Query/storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
        }
    }

    /// Parses the query/storage representation (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "image" => Some(Self::Image),
            _ => None,
        }
    }

    fn from_extension(extension: &str) -> Option<Self> {
        let lower = extension.to_ascii_lowercase();
        if lower == "pdf" {
            return Some(Self::Pdf);
        }
        if IMAGE_EXTENSIONS.contains(&lower.as_str()) {
            return Some(Self::Image);
        }
        None
    }
}

/// Uploaded study material attached to one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub subject_id: SubjectId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub file_url: String,
    /// Size in bytes.
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub views: u64,
    pub status: NoteStatus,
    pub created_at: DateTime<Utc>,
}

impl Note {
    /// Checks required fields and subject linkage.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("note", "id", &self.id)?;
        require_text("note", "subject_id", &self.subject_id)?;
        require_text("note", "title", &self.title)?;
        require_text("note", "file_url", &self.file_url)
    }

    /// Lowercase file extension from `file_url`, if any.
    pub fn file_extension(&self) -> Option<String> {
        FILE_EXTENSION_RE
            .captures(self.file_url.trim())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_ascii_lowercase())
    }

    /// File category derived from the extension.
    pub fn file_type(&self) -> Option<FileType> {
        self.file_extension()
            .as_deref()
            .and_then(FileType::from_extension)
    }
}

impl CatalogRecord for Note {
    const ENTITY: &'static str = "note";

    fn record_id(&self) -> &str {
        &self.id
    }

    fn validate_record(&self) -> Result<(), ModelValidationError> {
        self.validate()
    }
}

/// Human-readable byte size (`512 B`, `1.5 KB`, `2.3 MB`).
pub fn format_file_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < MIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::{format_file_size, FileType, Note, NoteStatus};
    use chrono::{TimeZone, Utc};

    fn note_with_url(url: &str) -> Note {
        Note {
            id: "note_001".to_string(),
            subject_id: "subj_001".to_string(),
            title: "Python Basics".to_string(),
            description: String::new(),
            file_url: url.to_string(),
            file_size: 0,
            tags: Vec::new(),
            downloads: 0,
            views: 0,
            status: NoteStatus::Ready,
            created_at: Utc.with_ymd_and_hms(2024, 9, 15, 10, 30, 0).unwrap(),
        }
    }

    #[test]
    fn file_type_follows_url_extension() {
        assert_eq!(
            note_with_url("https://cdn.example.com/a/python.PDF").file_type(),
            Some(FileType::Pdf)
        );
        assert_eq!(
            note_with_url("/uploads/board.jpeg?sig=abc").file_type(),
            Some(FileType::Image)
        );
        assert_eq!(note_with_url("/uploads/archive.zip").file_type(), None);
        assert_eq!(note_with_url("/uploads/noext").file_extension(), None);
    }

    #[test]
    fn note_deserializes_from_backend_shape() {
        let raw = r#"{
            "id": "note_001",
            "subject_id": "subj_001",
            "title": "Python Basics",
            "file_url": "/files/python_basics.pdf",
            "status": "ready",
            "created_at": "2024-09-15T10:30:00Z"
        }"#;
        let note: Note = serde_json::from_str(raw).unwrap();
        assert_eq!(note.status, NoteStatus::Ready);
        assert!(note.tags.is_empty());
        assert!(note.validate().is_ok());
    }

    #[test]
    fn format_file_size_uses_binary_units() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2_457_600), "2.3 MB");
    }

    #[test]
    fn file_type_parse_is_case_insensitive() {
        assert_eq!(FileType::parse(" PDF "), Some(FileType::Pdf));
        assert_eq!(FileType::parse("video"), None);
    }
}
