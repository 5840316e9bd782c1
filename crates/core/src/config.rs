use crate::chunking::ChunkingConfig;
use crate::error::IngestError;

pub const DEFAULT_COLLECTION: &str = "learning_vectors";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-large";

/// Everything an ingestion run needs to know, passed in explicitly. The
/// binary fills this from flags and environment variables; core code never
/// reads the environment itself.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub qdrant_url: String,
    pub qdrant_api_key: Option<String>,
    pub collection_name: String,
    pub embedding_model: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            qdrant_url: "http://localhost:6333".to_string(),
            qdrant_api_key: None,
            collection_name: DEFAULT_COLLECTION.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            chunk_size: 1_000,
            chunk_overlap: 400,
        }
    }
}

impl IngestConfig {
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.collection_name.trim().is_empty() {
            return Err(IngestError::InvalidArgument(
                "collection name must not be empty".to_string(),
            ));
        }
        self.chunking().validate()
    }

    pub fn chunking(&self) -> ChunkingConfig {
        ChunkingConfig {
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
        }
    }
}
