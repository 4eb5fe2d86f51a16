use crate::core::search::{EmbeddingError, EmbeddingStore};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use std::collections::HashMap;
use std::path::Path;

/// SQLite caps bound parameters per statement; stay well below it.
const KEYS_PER_QUERY: usize = 500;

/// Embedding cache persisted in SQLite.
///
/// Vectors are stored as little-endian `f32` blobs keyed by content hash.
pub struct SqliteEmbeddingStore {
    pool: Pool<Sqlite>,
}

impl SqliteEmbeddingStore {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure the file exists if it's a file path
        let path_str = database_url.trim_start_matches("sqlite://");
        if !database_url.contains(":memory:") && !Path::new(path_str).exists() {
            if let Some(parent) = Path::new(path_str).parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::File::create(path_str)?;
        }

        let conn_str = if database_url.starts_with("sqlite:") {
            database_url.to_string()
        } else {
            format!("sqlite://{}", database_url)
        };

        let pool = SqlitePoolOptions::new().connect(&conn_str).await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS embeddings (
                key TEXT PRIMARY KEY,
                vector BLOB NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn store_error(e: sqlx::Error) -> EmbeddingError {
    EmbeddingError::Store(e.to_string())
}

fn encode_vector(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|x| x.to_le_bytes()).collect()
}

fn decode_vector(bytes: &[u8]) -> Result<Vec<f32>, EmbeddingError> {
    if bytes.len() % 4 != 0 {
        return Err(EmbeddingError::Store(format!(
            "Corrupt vector blob of {} bytes",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

#[async_trait]
impl EmbeddingStore for SqliteEmbeddingStore {
    async fn get_many(&self, keys: &[String]) -> Result<HashMap<String, Vec<f32>>, EmbeddingError> {
        let mut found = HashMap::new();

        for batch in keys.chunks(KEYS_PER_QUERY) {
            let placeholders = vec!["?"; batch.len()].join(", ");
            let sql = format!(
                "SELECT key, vector FROM embeddings WHERE key IN ({})",
                placeholders
            );

            let mut query = sqlx::query(&sql);
            for key in batch {
                query = query.bind(key);
            }

            let rows = query.fetch_all(&self.pool).await.map_err(store_error)?;
            for row in rows {
                let key: String = row.get("key");
                let bytes: Vec<u8> = row.get("vector");
                found.insert(key, decode_vector(&bytes)?);
            }
        }

        Ok(found)
    }

    async fn put_many(&self, items: &[(String, Vec<f32>)]) -> Result<(), EmbeddingError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        for (key, vector) in items {
            sqlx::query(
                r#"
                INSERT INTO embeddings (key, vector, created_at)
                VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET
                vector = excluded.vector
                "#,
            )
            .bind(key)
            .bind(encode_vector(vector))
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;
        }

        tx.commit().await.map_err(store_error)
    }

    async fn count(&self) -> Result<usize, EmbeddingError> {
        let row = sqlx::query("SELECT COUNT(*) FROM embeddings")
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(row.get::<i64, _>(0) as usize)
    }
}
