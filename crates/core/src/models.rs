use serde::{Deserialize, Serialize};

/// One page of text extracted from a downloaded PDF, tagged with the URL it
/// came from. Pages from every input URL accumulate in order before chunking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentPage {
    pub source_url: String,
    pub page_number: u32,
    pub text: String,
}

/// The unit of embedding and storage. A chunk is a contiguous span of its
/// page's text and inherits that page's metadata; `chunk_index` is global
/// across the whole ingestion batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextChunk {
    pub text: String,
    pub source_url: String,
    pub page_number: u32,
    pub chunk_index: u64,
}

/// Counts produced by a completed ingestion run.
#[derive(Debug, Clone, Copy)]
pub struct IngestionReport {
    pub documents: usize,
    pub pages: usize,
    pub chunks: usize,
}
