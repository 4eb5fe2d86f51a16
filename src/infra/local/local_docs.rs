// Folder-of-text-files backend.
// Each `*.txt` file is one document; its file stem doubles as id and name,
// and every line is a paragraph. Lesson index files live in `indexes/`.

use crate::core::docs::{DocSummary, DocsError, DocsSource, DocumentText, IndexFileStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

const INDEX_DIR: &str = "indexes";

pub struct LocalDocsSource {
    root: PathBuf,
}

impl LocalDocsSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn doc_path(&self, file_id: &str) -> Result<PathBuf, DocsError> {
        check_id(file_id)?;
        Ok(self.root.join(format!("{}.txt", file_id)))
    }

    fn index_path(&self, file_id: &str) -> Result<PathBuf, DocsError> {
        check_id(file_id)?;
        Ok(self.root.join(INDEX_DIR).join(format!("{}.json", file_id)))
    }

    async fn read_text(&self, file_id: &str) -> Result<String, DocsError> {
        let path = self.doc_path(file_id)?;
        fs::read_to_string(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => DocsError::NotFound(file_id.to_string()),
            _ => DocsError::Store(format!("{}: {}", path.display(), e)),
        })
    }
}

#[async_trait]
impl DocsSource for LocalDocsSource {
    async fn list_documents(&self) -> Result<Vec<DocSummary>, DocsError> {
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| DocsError::Store(format!("{}: {}", self.root.display(), e)))?;

        let mut docs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DocsError::Store(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let mut summary = DocSummary::new(stem, stem);
            if let Ok(metadata) = entry.metadata().await {
                summary.modified_time = metadata.modified().ok().map(DateTime::<Utc>::from);
                summary.created_time = metadata.created().ok().map(DateTime::<Utc>::from);
            }
            docs.push(summary);
        }

        Ok(docs)
    }

    async fn fetch_document(&self, file_id: &str) -> Result<DocumentText, DocsError> {
        let text = self.read_text(file_id).await?;
        Ok(DocumentText {
            id: file_id.to_string(),
            name: file_id.to_string(),
            paragraphs: text
                .lines()
                .map(|line| line.trim_end_matches('\r').to_string())
                .collect(),
        })
    }

    async fn find_by_content(&self, query: &str) -> Result<Vec<DocSummary>, DocsError> {
        let needle = query.to_lowercase();
        let mut hits = Vec::new();

        for doc in self.list_documents().await? {
            match self.read_text(&doc.id).await {
                Ok(text) if text.to_lowercase().contains(&needle) => hits.push(doc),
                Ok(_) => {}
                Err(e) => tracing::warn!(file_id = %doc.id, error = %e, "Skipping unreadable file"),
            }
        }

        Ok(hits)
    }
}

#[async_trait]
impl IndexFileStore for LocalDocsSource {
    async fn read_index(&self, file_id: &str) -> Result<serde_json::Value, DocsError> {
        let path = self.index_path(file_id)?;
        let text = fs::read_to_string(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => DocsError::NotFound(file_id.to_string()),
            _ => DocsError::Store(e.to_string()),
        })?;

        serde_json::from_str(&text)
            .map_err(|e| DocsError::Store(format!("Index file {} is not valid JSON: {}", file_id, e)))
    }

    async fn write_index(
        &self,
        file_id: Option<&str>,
        name: &str,
        body: &serde_json::Value,
    ) -> Result<String, DocsError> {
        let file_id = match file_id {
            Some(id) => {
                if !fs::try_exists(self.index_path(id)?).await.unwrap_or(false) {
                    return Err(DocsError::NotFound(id.to_string()));
                }
                id.to_string()
            }
            None => slug(name),
        };

        let path = self.index_path(&file_id)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DocsError::Store(e.to_string()))?;
        }

        let text = serde_json::to_string_pretty(body).map_err(|e| DocsError::Store(e.to_string()))?;
        fs::write(&path, text)
            .await
            .map_err(|e| DocsError::Store(e.to_string()))?;

        tracing::debug!(file_id = %file_id, "Wrote lesson index file");
        Ok(file_id)
    }
}

/// Ids map straight onto file names, so anything that could leave the folder
/// is refused.
fn check_id(file_id: &str) -> Result<(), DocsError> {
    if file_id.is_empty() || file_id.contains(&['/', '\\'][..]) || file_id.contains("..") {
        return Err(DocsError::InvalidInput(format!("Invalid file id: {}", file_id)));
    }
    Ok(())
}

/// "Charlotte lesson index.json" -> "charlotte-lesson-index"
fn slug(name: &str) -> String {
    let stem = name.strip_suffix(".json").unwrap_or(name);
    let mut out = String::new();
    for c in stem.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    let out = out.trim_end_matches('-').to_string();
    if out.is_empty() {
        "index".to_string()
    } else {
        out
    }
}
