use crate::error::IndexError;
use crate::models::TextChunk;
use crate::traits::VectorIndex;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

pub struct QdrantStore {
    endpoint: String,
    api_key: Option<String>,
    collection: String,
    client: Client,
}

impl QdrantStore {
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        api_key: Option<String>,
        collection: impl Into<String>,
    ) -> Self {
        let endpoint = endpoint.into();
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            collection: collection.into(),
            client,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("api-key", key),
            None => request,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.endpoint, self.collection)
    }
}

#[async_trait]
impl VectorIndex for QdrantStore {
    async fn ensure_collection(&self, vector_size: usize) -> Result<(), IndexError> {
        let response = self
            .authorized(self.client.get(self.collection_url()))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status != StatusCode::NOT_FOUND {
            return Err(IndexError::BackendResponse {
                backend: "qdrant".to_string(),
                details: status.to_string(),
            });
        }

        let response = self
            .authorized(self.client.put(self.collection_url()))
            .json(&json!({
                "vectors": { "size": vector_size, "distance": "Cosine" },
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IndexError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

        Ok(())
    }

    async fn upsert_chunks(
        &self,
        chunks: &[TextChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<(), IndexError> {
        let points = build_points(chunks, embeddings, &Utc::now().to_rfc3339())?;
        if points.is_empty() {
            return Ok(());
        }

        let response = self
            .authorized(
                self.client
                    .put(format!("{}/points?wait=true", self.collection_url())),
            )
            .json(&json!({ "points": points }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IndexError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

        Ok(())
    }
}

/// Point ids are fresh uuids, so re-ingesting the same document appends new
/// records rather than overwriting earlier ones.
fn build_points(
    chunks: &[TextChunk],
    embeddings: &[Vec<f32>],
    ingested_at: &str,
) -> Result<Vec<Value>, IndexError> {
    if chunks.len() != embeddings.len() {
        return Err(IndexError::EmbeddingCountMismatch {
            submitted: chunks.len(),
            returned: embeddings.len(),
        });
    }

    let vector_size = embeddings.first().map(Vec::len).unwrap_or(0);

    chunks
        .iter()
        .zip(embeddings.iter())
        .map(|(chunk, embedding)| {
            if embedding.len() != vector_size {
                return Err(IndexError::Request(format!(
                    "embedding dimension {} != {}",
                    embedding.len(),
                    vector_size
                )));
            }

            Ok(json!({
                "id": Uuid::new_v4().to_string(),
                "vector": embedding,
                "payload": {
                    "text": chunk.text,
                    "source": chunk.source_url,
                    "page": chunk.page_number,
                    "chunk_index": chunk.chunk_index,
                    "ingested_at": ingested_at,
                },
            }))
        })
        .collect()
}
