// The documents service: listing, reading, paging and batch reads.
// Like the rest of the core it has no HTTP or Google types; it only talks to
// a `DocsSource` and caches what it reads.

use super::doc_cache::DocCache;
use super::docs_models::{
    estimate_tokens, BatchReadItem, DocSummary, DocumentText, DocumentView, PageView,
};
use super::docs_source::{DocsError, DocsSource};
use super::paging::{paginate, MAX_PAGE_SIZE};
use std::collections::HashSet;
use std::sync::Arc;

/// Most documents a single batch read may ask for.
pub const MAX_BATCH: usize = 20;

pub struct DocsService {
    source: Arc<dyn DocsSource>,
    cache: DocCache,
    default_page_size: usize,
}

impl DocsService {
    pub fn new(source: Arc<dyn DocsSource>, cache: DocCache, default_page_size: usize) -> Self {
        Self {
            source,
            cache,
            default_page_size: default_page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Every visible document, sorted by name (case-insensitive).
    pub async fn list_documents(&self) -> Result<Vec<DocSummary>, DocsError> {
        let mut docs = self.source.list_documents().await?;
        sort_by_name(&mut docs);
        Ok(docs)
    }

    /// Documents whose name contains `title`, ignoring case.
    pub async fn search_by_title(&self, title: &str) -> Result<Vec<DocSummary>, DocsError> {
        let needle = title.trim().to_lowercase();
        if needle.is_empty() {
            return Err(DocsError::InvalidInput("title must not be empty".to_string()));
        }

        let docs = self.list_documents().await?;
        Ok(docs
            .into_iter()
            .filter(|d| d.name.to_lowercase().contains(&needle))
            .collect())
    }

    /// Narrowed candidates for a full-text query, sorted by name.
    pub async fn find_by_content(&self, query: &str) -> Result<Vec<DocSummary>, DocsError> {
        let mut docs = self.source.find_by_content(query).await?;
        sort_by_name(&mut docs);
        Ok(docs)
    }

    /// Reads a document, serving it from cache when fresh.
    pub async fn document(&self, file_id: &str) -> Result<Arc<DocumentText>, DocsError> {
        let file_id = file_id.trim();
        if file_id.is_empty() {
            return Err(DocsError::InvalidInput("file_id is required".to_string()));
        }

        if let Some(doc) = self.cache.get(file_id) {
            tracing::debug!(file_id, "Document served from cache");
            return Ok(doc);
        }

        let doc = Arc::new(self.source.fetch_document(file_id).await?);
        tracing::info!(
            file_id,
            name = %doc.name,
            paragraphs = doc.paragraphs.len(),
            "Fetched document"
        );
        self.cache.insert(Arc::clone(&doc));
        Ok(doc)
    }

    pub async fn read_document(&self, file_id: &str) -> Result<DocumentView, DocsError> {
        Ok(self.document(file_id).await?.to_view())
    }

    pub async fn read_page(
        &self,
        file_id: &str,
        page: usize,
        page_size: Option<usize>,
        end_page: Option<usize>,
    ) -> Result<PageView, DocsError> {
        let doc = self.document(file_id).await?;
        let page_size = page_size.unwrap_or(self.default_page_size);
        let slice = paginate(&doc.paragraphs, page, page_size, end_page)?;
        let content = slice.paragraphs.join("\n");

        Ok(PageView {
            file_id: doc.id.clone(),
            name: doc.name.clone(),
            page: slice.page,
            end_page: slice.end_page,
            page_size,
            total_pages: slice.total_pages,
            has_more: slice.has_more(),
            token_count: estimate_tokens(&content),
            content,
        })
    }

    /// Reads several documents, keeping request order and dropping duplicate ids.
    pub async fn batch_read(&self, file_ids: &[String]) -> Result<Vec<BatchReadItem>, DocsError> {
        if file_ids.is_empty() {
            return Err(DocsError::InvalidInput("file_ids must not be empty".to_string()));
        }
        if file_ids.len() > MAX_BATCH {
            return Err(DocsError::InvalidInput(format!(
                "At most {} documents can be read per batch",
                MAX_BATCH
            )));
        }

        let mut seen = HashSet::new();
        let mut items = Vec::new();

        for file_id in file_ids {
            let file_id = file_id.trim();
            if !seen.insert(file_id.to_string()) {
                continue;
            }

            let item = match self.read_document(file_id).await {
                Ok(view) => BatchReadItem {
                    file_id: file_id.to_string(),
                    ok: true,
                    document: Some(view),
                    error: None,
                },
                Err(e) => {
                    tracing::warn!(file_id, "Batch read failed for document: {}", e);
                    BatchReadItem {
                        file_id: file_id.to_string(),
                        ok: false,
                        document: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            items.push(item);
        }

        Ok(items)
    }

    /// Reads every listed document accepted by `keep`.
    ///
    /// Documents that fail to load are logged and skipped so one broken file
    /// does not hide the rest.
    pub async fn load_documents<F>(&self, keep: F) -> Result<Vec<Arc<DocumentText>>, DocsError>
    where
        F: Fn(&DocSummary) -> bool,
    {
        let listing = self.list_documents().await?;
        let mut docs = Vec::new();

        for summary in listing.iter().filter(|d| keep(d)) {
            match self.document(&summary.id).await {
                Ok(doc) => docs.push(doc),
                Err(e) => {
                    tracing::warn!(file_id = %summary.id, "Skipping unreadable document: {}", e)
                }
            }
        }

        Ok(docs)
    }

    pub fn cached_documents(&self) -> usize {
        self.cache.len()
    }
}

fn sort_by_name(docs: &mut [DocSummary]) {
    docs.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::local::LocalDocsSource;
    use std::time::Duration;
    use tempfile::TempDir;

    fn service_with(files: &[(&str, &str)]) -> (TempDir, DocsService) {
        let dir = TempDir::new().unwrap();
        for (name, text) in files {
            std::fs::write(dir.path().join(format!("{}.txt", name)), text).unwrap();
        }
        let source = Arc::new(LocalDocsSource::new(dir.path()));
        let service = DocsService::new(source, DocCache::new(Duration::from_secs(60), 16), 2);
        (dir, service)
    }

    #[tokio::test]
    async fn test_list_sorted_by_name() {
        let (_dir, service) = service_with(&[("zoe", "z"), ("Adam", "a"), ("mia", "m")]);
        let names: Vec<String> = service
            .list_documents()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["Adam", "mia", "zoe"]);
    }

    #[tokio::test]
    async fn test_search_by_title_is_case_insensitive() {
        let (_dir, service) = service_with(&[
            ("Charlotte - Monday", "x"),
            ("Oliver - Tuesday", "y"),
        ]);
        let hits = service.search_by_title("charl").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Charlotte - Monday");

        assert!(matches!(
            service.search_by_title("  ").await,
            Err(DocsError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_read_page_uses_default_page_size() {
        let (_dir, service) = service_with(&[("notes", "one\ntwo\nthree")]);
        let page = service.read_page("notes", 2, None, None).await.unwrap();
        assert_eq!(page.content, "three");
        assert_eq!(page.total_pages, 2);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn test_batch_read_reports_each_document() {
        let (_dir, service) = service_with(&[("a", "alpha"), ("b", "beta")]);
        let ids = vec![
            "a".to_string(),
            "missing".to_string(),
            "b".to_string(),
            "a".to_string(),
        ];

        let items = service.batch_read(&ids).await.unwrap();
        assert_eq!(items.len(), 3);
        assert!(items[0].ok);
        assert!(!items[1].ok);
        assert!(items[1].error.as_deref().unwrap().contains("missing"));
        assert_eq!(items[2].document.as_ref().unwrap().content, "beta");
    }

    #[tokio::test]
    async fn test_batch_read_limits() {
        let (_dir, service) = service_with(&[]);
        assert!(matches!(
            service.batch_read(&[]).await,
            Err(DocsError::InvalidInput(_))
        ));

        let too_many: Vec<String> = (0..=MAX_BATCH).map(|i| i.to_string()).collect();
        assert!(matches!(
            service.batch_read(&too_many).await,
            Err(DocsError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_documents_are_cached() {
        let (dir, service) = service_with(&[("a", "before")]);
        assert_eq!(service.read_document("a").await.unwrap().content, "before");

        std::fs::write(dir.path().join("a.txt"), "after").unwrap();
        assert_eq!(service.read_document("a").await.unwrap().content, "before");
        assert_eq!(service.cached_documents(), 1);
    }
}
