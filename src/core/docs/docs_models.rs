use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of a document listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocSummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
}

impl DocSummary {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            modified_time: None,
            created_time: None,
        }
    }
}

/// A document flattened into plain-text paragraphs (no trailing newlines).
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentText {
    pub id: String,
    pub name: String,
    pub paragraphs: Vec<String>,
}

impl DocumentText {
    pub fn content(&self) -> String {
        self.paragraphs.join("\n")
    }

    pub fn to_view(&self) -> DocumentView {
        let content = self.content();
        DocumentView {
            file_id: self.id.clone(),
            name: self.name.clone(),
            token_count: estimate_tokens(&content),
            paragraph_count: self.paragraphs.len(),
            content,
        }
    }
}

/// What `readDocById` hands back to the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentView {
    pub file_id: String,
    pub name: String,
    pub content: String,
    pub token_count: usize,
    pub paragraph_count: usize,
}

/// A page range of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageView {
    pub file_id: String,
    pub name: String,
    pub page: usize,
    pub end_page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub has_more: bool,
    pub content: String,
    pub token_count: usize,
}

/// Per-document outcome of a batch read. One bad id never fails the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReadItem {
    pub file_id: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Estimates the number of tokens in a text string.
///
/// Uses a simple heuristic: ~4 characters per token on average, rounded up.
pub fn estimate_tokens(text: &str) -> usize {
    (text.chars().count() + 3) / 4
}
