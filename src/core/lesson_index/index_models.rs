use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The JSON sidecar stored per student.
///
/// This is a best-effort cache of the lesson notes: it is rebuilt from the
/// document on every update and never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonIndex {
    pub student: String,
    pub doc_id: String,
    pub doc_name: String,
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<IndexEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub date: NaiveDate,
    pub heading: String,
    pub summary: String,
    pub keywords: Vec<String>,
}

/// Result of `updateIndexJson`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexUpdate {
    pub student: String,
    pub doc_id: String,
    pub entry_count: usize,
    pub index_file_id: String,
}
