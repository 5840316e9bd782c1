use crate::chunking::split_pages;
use crate::config::IngestConfig;
use crate::embeddings::Embedder;
use crate::error::{IndexError, IngestError};
use crate::extractor::extract_page_texts;
use crate::fetch::{cleanup_temp_files, download_pdf};
use crate::models::{DocumentPage, IngestionReport};
use crate::traits::VectorIndex;
use reqwest::Client;
use tracing::info;

/// One-shot ingestion of PDF URLs into a vector collection. All handles are
/// constructed by the caller and passed in; the pipeline holds no global
/// state and runs strictly sequentially: fetch every document, extract every
/// page, then chunk, embed, and write the whole batch once.
pub struct IngestPipeline<E, V> {
    config: IngestConfig,
    http: Client,
    embedder: E,
    index: V,
}

impl<E, V> IngestPipeline<E, V>
where
    E: Embedder + Send + Sync,
    V: VectorIndex + Send + Sync,
{
    pub fn new(
        config: IngestConfig,
        http: Client,
        embedder: E,
        index: V,
    ) -> Result<Self, IngestError> {
        config.validate()?;
        Ok(Self {
            config,
            http,
            embedder,
            index,
        })
    }

    /// Runs the whole pipeline for the given URLs. The first failing step
    /// aborts the run; temp files are removed best-effort afterwards either
    /// way.
    pub async fn run(&self, urls: &[String]) -> Result<IngestionReport, IngestError> {
        if urls.is_empty() {
            return Err(IngestError::InvalidArgument(
                "no pdf urls to ingest".to_string(),
            ));
        }

        let outcome = self.ingest(urls).await;
        cleanup_temp_files(urls).await;
        outcome
    }

    async fn ingest(&self, urls: &[String]) -> Result<IngestionReport, IngestError> {
        let pages = self.collect_pages(urls).await?;
        info!(total_pages = pages.len(), "collected pages across all pdfs");
        self.index_pages(urls.len(), pages).await
    }

    async fn collect_pages(&self, urls: &[String]) -> Result<Vec<DocumentPage>, IngestError> {
        let mut pages = Vec::new();

        for url in urls {
            let path = download_pdf(&self.http, url).await?;
            let extracted = extract_page_texts(&path)?;
            info!(page_count = extracted.len(), "loaded pages from pdf");

            pages.extend(extracted.into_iter().map(|page| DocumentPage {
                source_url: url.clone(),
                page_number: page.number,
                text: page.text,
            }));
        }

        Ok(pages)
    }

    /// Chunks, embeds, and indexes already-extracted pages: one batched
    /// embedding call, then one bulk write.
    pub async fn index_pages(
        &self,
        documents: usize,
        pages: Vec<DocumentPage>,
    ) -> Result<IngestionReport, IngestError> {
        let chunks = split_pages(&pages, self.config.chunking());
        info!(chunk_count = chunks.len(), "split pages into chunks");

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(IndexError::EmbeddingCountMismatch {
                submitted: chunks.len(),
                returned: embeddings.len(),
            }
            .into());
        }

        if let Some(first) = embeddings.first() {
            info!(
                collection = %self.config.collection_name,
                vector_size = first.len(),
                "indexing into vector store"
            );
            self.index.ensure_collection(first.len()).await?;
            self.index.upsert_chunks(&chunks, &embeddings).await?;
        }

        info!("indexing done");
        Ok(IngestionReport {
            documents,
            pages: pages.len(),
            chunks: chunks.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndexError;
    use crate::models::TextChunk;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[derive(Clone)]
    struct FakeEmbedder {
        dimensions: usize,
        shortfall: usize,
        batches: Arc<Mutex<Vec<usize>>>,
    }

    impl FakeEmbedder {
        fn new(dimensions: usize) -> Self {
            Self {
                dimensions,
                shortfall: 0,
                batches: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn with_shortfall(dimensions: usize, shortfall: usize) -> Self {
            Self {
                shortfall,
                ..Self::new(dimensions)
            }
        }
    }

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, IndexError> {
            self.batches
                .lock()
                .expect("batches lock")
                .push(texts.len());
            let returned = texts.len().saturating_sub(self.shortfall);
            Ok((0..returned).map(|_| vec![0.5; self.dimensions]).collect())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingIndex {
        ensured_sizes: Arc<Mutex<Vec<usize>>>,
        upsert_sizes: Arc<Mutex<Vec<usize>>>,
    }

    #[async_trait]
    impl VectorIndex for RecordingIndex {
        async fn ensure_collection(&self, vector_size: usize) -> Result<(), IndexError> {
            self.ensured_sizes
                .lock()
                .expect("ensured lock")
                .push(vector_size);
            Ok(())
        }

        async fn upsert_chunks(
            &self,
            chunks: &[TextChunk],
            embeddings: &[Vec<f32>],
        ) -> Result<(), IndexError> {
            assert_eq!(chunks.len(), embeddings.len());
            self.upsert_sizes
                .lock()
                .expect("upserts lock")
                .push(chunks.len());
            Ok(())
        }
    }

    fn pipeline(
        embedder: FakeEmbedder,
        index: RecordingIndex,
    ) -> IngestPipeline<FakeEmbedder, RecordingIndex> {
        IngestPipeline::new(IngestConfig::default(), Client::new(), embedder, index)
            .expect("default config is valid")
    }

    fn long_page(page_number: u32) -> DocumentPage {
        DocumentPage {
            source_url: "https://host/doc.pdf".to_string(),
            page_number,
            text: (0..1_500)
                .map(|index| char::from(b'a' + (index % 26) as u8))
                .collect(),
        }
    }

    #[tokio::test]
    async fn batch_is_embedded_once_and_written_once() {
        let embedder = FakeEmbedder::new(4);
        let index = RecordingIndex::default();
        let pipeline = pipeline(embedder.clone(), index.clone());

        let report = pipeline
            .index_pages(1, vec![long_page(1), long_page(2)])
            .await
            .expect("ingestion succeeds");

        assert_eq!(report.pages, 2);
        assert!(report.chunks >= 4);

        let batches = embedder.batches.lock().expect("batches lock").clone();
        assert_eq!(batches, vec![report.chunks]);

        let upserts = index.upsert_sizes.lock().expect("upserts lock").clone();
        assert_eq!(upserts, vec![report.chunks]);

        let ensured = index.ensured_sizes.lock().expect("ensured lock").clone();
        assert_eq!(ensured, vec![4]);
    }

    #[tokio::test]
    async fn embedding_count_mismatch_aborts_before_any_write() {
        let embedder = FakeEmbedder::with_shortfall(4, 1);
        let index = RecordingIndex::default();
        let pipeline = pipeline(embedder, index.clone());

        let result = pipeline.index_pages(1, vec![long_page(1)]).await;
        match result {
            Err(IngestError::Index(IndexError::EmbeddingCountMismatch { .. })) => {}
            other => panic!("expected EmbeddingCountMismatch, got {other:?}"),
        }

        assert!(index.upsert_sizes.lock().expect("upserts lock").is_empty());
        assert!(index.ensured_sizes.lock().expect("ensured lock").is_empty());
    }

    #[tokio::test]
    async fn empty_url_list_is_rejected() {
        let pipeline = pipeline(FakeEmbedder::new(4), RecordingIndex::default());
        let result = pipeline.run(&[]).await;
        assert!(matches!(result, Err(IngestError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn failing_fetch_aborts_before_embedding_or_store() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener addr");
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buffer = [0u8; 1024];
                let _ = socket.read(&mut buffer).await;
                let _ = socket
                    .write_all(
                        b"HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                    )
                    .await;
            }
        });

        let embedder = FakeEmbedder::new(4);
        let index = RecordingIndex::default();
        let pipeline = pipeline(embedder.clone(), index.clone());

        let urls = vec![format!("http://{addr}/missing.pdf")];
        match pipeline.run(&urls).await {
            Err(IngestError::Fetch { status, .. }) => {
                assert_eq!(status.as_u16(), 404);
            }
            other => panic!("expected Fetch error, got {other:?}"),
        }

        assert!(embedder.batches.lock().expect("batches lock").is_empty());
        assert!(index.upsert_sizes.lock().expect("upserts lock").is_empty());
    }
}
