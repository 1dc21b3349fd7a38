//! PostgreSQL vector store backed by the `pgvector` extension.
//!
//! All collections share the `rag_chunks` table, keyed by
//! `(collection, id)`. Vectors are bound as text literals and cast with
//! `::vector`; ranking uses the cosine distance operator `<=>`.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::{Chunk, ScoredChunk, StoreError, VectorStore, validate_collection};

/// Run all embedded database migrations against the given pool.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

pub struct PgVectorStore {
    pool: PgPool,
    collection: String,
}

impl PgVectorStore {
    /// Connect, run migrations, and bind to `collection`.
    pub async fn connect(database_url: &str, collection: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await?;
        migrate(&pool).await?;
        Self::with_pool(pool, collection)
    }

    /// Use an existing pool. Migrations must already have been applied.
    pub fn with_pool(pool: PgPool, collection: &str) -> Result<Self, StoreError> {
        validate_collection(collection)?;
        Ok(Self {
            pool,
            collection: collection.to_string(),
        })
    }
}

/// Format a vector as a pgvector literal: `[0.1,0.2,...]`.
fn to_vector_literal(embedding: &[f32]) -> String {
    format!(
        "[{}]",
        embedding
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    )
}

/// Parse pgvector's text output, which is JSON-compatible.
fn from_vector_literal(text: &str) -> Result<Vec<f32>, StoreError> {
    Ok(serde_json::from_str(text)?)
}

#[async_trait]
impl VectorStore for PgVectorStore {
    async fn add(&self, chunks: Vec<Chunk>) -> Result<usize, StoreError> {
        let mut tx = self.pool.begin().await?;
        for chunk in &chunks {
            sqlx::query(
                r#"
                INSERT INTO rag_chunks (collection, id, content, source, chunk_index, embedding)
                VALUES ($1, $2, $3, $4, $5, $6::vector)
                ON CONFLICT (collection, id) DO UPDATE SET
                    content = EXCLUDED.content,
                    source = EXCLUDED.source,
                    chunk_index = EXCLUDED.chunk_index,
                    embedding = EXCLUDED.embedding
                "#,
            )
            .bind(&self.collection)
            .bind(&chunk.id)
            .bind(&chunk.content)
            .bind(&chunk.source)
            .bind(chunk.chunk_index as i32)
            .bind(to_vector_literal(&chunk.embedding))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(chunks.len())
    }

    async fn similarity_search(
        &self,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredChunk>, StoreError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, (String, String, String, i32, String, f64)>(
            r#"
            SELECT id, content, source, chunk_index, embedding::text,
                   1 - (embedding <=> $1::vector) AS similarity
            FROM rag_chunks
            WHERE collection = $2
            ORDER BY embedding <=> $1::vector, seq
            LIMIT $3
            "#,
        )
        .bind(to_vector_literal(embedding))
        .bind(&self.collection)
        .bind(k as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(id, content, source, chunk_index, vector, similarity)| {
                Ok(ScoredChunk {
                    chunk: Chunk {
                        id,
                        content,
                        source,
                        chunk_index: chunk_index.max(0) as usize,
                        embedding: from_vector_literal(&vector)?,
                    },
                    score: similarity as f32,
                })
            })
            .collect()
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rag_chunks WHERE collection = $1")
                .bind(&self.collection)
                .fetch_one(&self.pool)
                .await?;
        Ok(total.max(0) as usize)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM rag_chunks WHERE collection = $1")
            .bind(&self.collection)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
