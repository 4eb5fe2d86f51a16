// Ports for the document backends.
// The core defines WHAT it needs from a document backend; the infra layer
// decides whether that is Google Drive or a folder of text files.

use super::docs_models::{DocSummary, DocumentText};
use async_trait::async_trait;
use thiserror::Error;

/// Everything that can go wrong while serving documents.
///
/// The API layer maps each variant to an HTTP status, so pick the variant by
/// who is at fault: the caller, the missing document, or the upstream service.
#[derive(Debug, Error)]
pub enum DocsError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("{0} is not configured")]
    NotConfigured(String),

    #[error("Storage error: {0}")]
    Store(String),
}

/// A place documents can be listed and read from.
#[async_trait]
pub trait DocsSource: Send + Sync {
    /// Lists every document visible to the backend, in no particular order.
    async fn list_documents(&self) -> Result<Vec<DocSummary>, DocsError>;

    /// Reads one document and flattens it into plain-text paragraphs.
    async fn fetch_document(&self, file_id: &str) -> Result<DocumentText, DocsError>;

    /// Narrows the candidates for a full-text query.
    ///
    /// Backends with server-side search return only likely matches; the
    /// caller still verifies each candidate against the real text.
    async fn find_by_content(&self, query: &str) -> Result<Vec<DocSummary>, DocsError>;
}

/// Storage for the per-student lesson index sidecar files.
#[async_trait]
pub trait IndexFileStore: Send + Sync {
    /// Reads a stored index file as raw JSON.
    async fn read_index(&self, file_id: &str) -> Result<serde_json::Value, DocsError>;

    /// Writes an index file and returns its id.
    ///
    /// With `file_id` the existing file is overwritten; without it a new file
    /// called `name` is created.
    async fn write_index(
        &self,
        file_id: Option<&str>,
        name: &str,
        body: &serde_json::Value,
    ) -> Result<String, DocsError>;
}
