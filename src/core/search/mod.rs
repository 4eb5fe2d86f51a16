pub mod chunking;
pub mod content_search;
pub mod embeddings;
pub mod semantic_search;

pub use content_search::{ContentSearchService, SearchHit};
pub use embeddings::{EmbeddingError, EmbeddingProvider, EmbeddingStore};
pub use semantic_search::{RebuildReport, SemanticHit, SemanticSearchService};
