//! Locker data models: files, links and notes kept per subject

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Image,
    Link,
    Note,
    #[serde(other)]
    Other,
}

impl FileType {
    pub fn all() -> [FileType; 5] {
        [Self::Pdf, Self::Image, Self::Link, Self::Note, Self::Other]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Image => "Imagem",
            Self::Link => "Link",
            Self::Note => "Nota",
            Self::Other => "Outro",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "image" | "imagem" | "img" => Some(Self::Image),
            "link" | "url" => Some(Self::Link),
            "note" | "nota" => Some(Self::Note),
            "other" | "outro" => Some(Self::Other),
            _ => None,
        }
    }
}

impl Default for FileType {
    fn default() -> Self {
        Self::Note
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockerFile {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type", default)]
    pub file_type: FileType,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub subject_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub event_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    /// Size in bytes, when known
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub size: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl LockerFile {
    pub fn new(name: String, file_type: FileType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            file_type,
            subject_id: None,
            event_id: None,
            url: None,
            description: None,
            size: None,
            created_at: Utc::now(),
        }
    }
}

impl Record for LockerFile {
    const COLLECTION: &'static str = "files";

    fn id(&self) -> Uuid {
        self.id
    }

    fn foreign_key(&self) -> Option<Uuid> {
        self.subject_id
    }
}

/// Fields for adding or editing a locker entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRequest {
    pub name: String,
    pub file_type: FileType,
    pub subject_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub size: Option<u64>,
}

/// Entry counts per type, for the locker header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockerStats {
    pub total: usize,
    pub pdfs: usize,
    pub images: usize,
    pub links: usize,
    pub notes: usize,
}

impl LockerStats {
    pub fn from_files(files: &[LockerFile]) -> Self {
        let count = |t: FileType| files.iter().filter(|f| f.file_type == t).count();
        Self {
            total: files.len(),
            pdfs: count(FileType::Pdf),
            images: count(FileType::Image),
            links: count(FileType::Link),
            notes: count(FileType::Note),
        }
    }
}

/// Human-readable size: `512 B`, `1.5 KB`, `2.0 MB`
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}
