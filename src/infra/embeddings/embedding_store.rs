// Implementations of the embedding cache.
// In-memory for local runs and tests, SQLite when EMBEDDINGS_DB is set.

pub mod in_memory;
pub mod sqlite_store;

pub use in_memory::InMemoryEmbeddingStore;
pub use sqlite_store::SqliteEmbeddingStore;
