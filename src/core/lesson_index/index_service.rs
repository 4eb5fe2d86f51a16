use super::index_builder::build_index;
use super::index_models::IndexUpdate;
use crate::core::docs::{DocsError, DocsService, IndexFileStore};
use crate::core::lessons::parse_lessons;
use std::sync::Arc;

/// Creates, refreshes and reads the per-student lesson index sidecars.
pub struct IndexService {
    docs: Arc<DocsService>,
    store: Arc<dyn IndexFileStore>,
}

impl IndexService {
    pub fn new(docs: Arc<DocsService>, store: Arc<dyn IndexFileStore>) -> Self {
        Self { docs, store }
    }

    /// Rebuilds the index for `student` from `doc_id` and writes it out.
    pub async fn update_index(
        &self,
        student: &str,
        doc_id: &str,
        index_file_id: Option<&str>,
    ) -> Result<IndexUpdate, DocsError> {
        let student = student.trim();
        if student.is_empty() {
            return Err(DocsError::InvalidInput("student is required".to_string()));
        }
        let index_file_id = index_file_id.map(str::trim).filter(|id| !id.is_empty());

        let doc = self.docs.document(doc_id).await?;
        let lessons = parse_lessons(&doc.paragraphs);
        let index = build_index(student, &doc, &lessons, chrono::Utc::now());

        let body = serde_json::to_value(&index).map_err(|e| DocsError::Store(e.to_string()))?;
        let file_name = format!("{} lesson index.json", student);
        let file_id = self
            .store
            .write_index(index_file_id, &file_name, &body)
            .await?;

        tracing::info!(
            student,
            doc_id = %doc.id,
            index_file_id = %file_id,
            entries = index.entries.len(),
            "Lesson index written"
        );

        Ok(IndexUpdate {
            student: student.to_string(),
            doc_id: doc.id.clone(),
            entry_count: index.entries.len(),
            index_file_id: file_id,
        })
    }

    /// Reads a stored index as-is. The sidecar has no schema guarantees, so
    /// it is passed through untouched.
    pub async fn read_index(&self, file_id: &str) -> Result<serde_json::Value, DocsError> {
        let file_id = file_id.trim();
        if file_id.is_empty() {
            return Err(DocsError::InvalidInput("file_id is required".to_string()));
        }
        self.store.read_index(file_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::docs::DocCache;
    use crate::core::lesson_index::index_models::LessonIndex;
    use crate::infra::local::LocalDocsSource;
    use std::time::Duration;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> IndexService {
        let source = Arc::new(LocalDocsSource::new(dir.path()));
        let docs = DocsService::new(
            Arc::clone(&source) as Arc<dyn crate::core::docs::DocsSource>,
            DocCache::new(Duration::from_secs(60), 16),
            50,
        );
        IndexService::new(Arc::new(docs), source)
    }

    #[tokio::test]
    async fn test_update_then_read_index() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("Charlotte - Monday.txt"),
            "Student: Charlotte\n05/05/2025\nScales in G major.\n12/05/2025\nSight reading.",
        )
        .unwrap();
        let service = service(&dir);

        let update = service
            .update_index("Charlotte", "Charlotte - Monday", None)
            .await
            .unwrap();
        assert_eq!(update.entry_count, 2);
        assert_eq!(update.doc_id, "Charlotte - Monday");

        let stored = service.read_index(&update.index_file_id).await.unwrap();
        let index: LessonIndex = serde_json::from_value(stored).unwrap();
        assert_eq!(index.student, "Charlotte");
        assert_eq!(index.entries[0].summary, "Scales in G major.");

        // Updating again with the id overwrites the same file.
        let again = service
            .update_index("Charlotte", "Charlotte - Monday", Some(&update.index_file_id))
            .await
            .unwrap();
        assert_eq!(again.index_file_id, update.index_file_id);
    }

    #[tokio::test]
    async fn test_update_requires_student_and_document() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        assert!(matches!(
            service.update_index(" ", "doc", None).await,
            Err(DocsError::InvalidInput(_))
        ));
        assert!(matches!(
            service.update_index("Charlotte", "missing", None).await,
            Err(DocsError::NotFound(_))
        ));
    }
}
