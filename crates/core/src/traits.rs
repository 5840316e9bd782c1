use crate::error::IndexError;
use crate::models::TextChunk;
use async_trait::async_trait;

#[async_trait]
pub trait VectorIndex {
    /// Makes sure the target collection exists with the given vector size.
    async fn ensure_collection(&self, vector_size: usize) -> Result<(), IndexError>;

    /// Writes all (chunk, embedding) pairs in one bulk call. Records are
    /// append-only; nothing is deduplicated or updated.
    async fn upsert_chunks(
        &self,
        chunks: &[TextChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<(), IndexError>;
}
