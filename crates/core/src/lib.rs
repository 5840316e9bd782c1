pub mod chunking;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod fetch;
pub mod models;
pub mod pipeline;
pub mod stores;
pub mod traits;

pub use chunking::{split_pages, split_text, ChunkingConfig};
pub use config::{IngestConfig, DEFAULT_COLLECTION, DEFAULT_EMBEDDING_MODEL};
pub use embeddings::{Embedder, OpenAiEmbedder, DEFAULT_OPENAI_BASE_URL};
pub use error::{IndexError, IngestError};
pub use extractor::{extract_page_texts, LopdfExtractor, PageText, PdfExtractor};
pub use fetch::{cleanup_temp_files, download_pdf, temp_pdf_path};
pub use models::{DocumentPage, IngestionReport, TextChunk};
pub use pipeline::IngestPipeline;
pub use stores::QdrantStore;
pub use traits::VectorIndex;
