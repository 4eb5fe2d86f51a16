pub mod doc_cache;
pub mod docs_models;
pub mod docs_service;
pub mod docs_source;
pub mod paging;

pub use doc_cache::DocCache;
pub use docs_models::{
    estimate_tokens, BatchReadItem, DocSummary, DocumentText, DocumentView, PageView,
};
pub use docs_service::DocsService;
pub use docs_source::{DocsError, DocsSource, IndexFileStore};
