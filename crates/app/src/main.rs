use chrono::Utc;
use clap::Parser;
use pdf_ingest_core::{
    IngestConfig, IngestPipeline, OpenAiEmbedder, QdrantStore, DEFAULT_COLLECTION,
    DEFAULT_EMBEDDING_MODEL, DEFAULT_OPENAI_BASE_URL,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pdf-vector-ingest", version)]
struct Cli {
    /// PDF URLs to download, chunk, embed, and index.
    #[arg(required = true)]
    urls: Vec<String>,

    /// Qdrant base URL
    #[arg(long, env = "QDRANT_URL", default_value = "http://localhost:6333")]
    qdrant_url: String,

    /// Qdrant API key
    #[arg(long, env = "QDRANT_API_KEY")]
    qdrant_api_key: Option<String>,

    /// Target Qdrant collection
    #[arg(long, default_value = DEFAULT_COLLECTION)]
    collection: String,

    /// API key for the embeddings endpoint
    #[arg(long, env = "OPENAI_API_KEY")]
    openai_api_key: String,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL)]
    openai_base_url: String,

    /// Embedding model name
    #[arg(long, default_value = DEFAULT_EMBEDDING_MODEL)]
    embedding_model: String,

    /// Maximum characters per chunk
    #[arg(long, default_value = "1000")]
    chunk_size: usize,

    /// Characters shared between consecutive chunks
    #[arg(long, default_value = "400")]
    chunk_overlap: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = IngestConfig {
        qdrant_url: cli.qdrant_url,
        qdrant_api_key: cli.qdrant_api_key,
        collection_name: cli.collection,
        embedding_model: cli.embedding_model,
        chunk_size: cli.chunk_size,
        chunk_overlap: cli.chunk_overlap,
    };

    let http = reqwest::Client::new();
    let embedder = OpenAiEmbedder::new(
        http.clone(),
        &cli.openai_base_url,
        &cli.openai_api_key,
        &config.embedding_model,
    );
    let store = QdrantStore::new(
        http.clone(),
        &config.qdrant_url,
        config.qdrant_api_key.clone(),
        &config.collection_name,
    );

    let pipeline = IngestPipeline::new(config, http, embedder, store)
        .map_err(|error| anyhow::anyhow!(error.to_string()))?;

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        url_count = cli.urls.len(),
        "pdf-vector-ingest boot"
    );

    let report = pipeline
        .run(&cli.urls)
        .await
        .map_err(|error| anyhow::anyhow!(error.to_string()))?;

    println!(
        "{} chunks from {} pages across {} pdfs indexed at {}",
        report.chunks,
        report.pages,
        report.documents,
        Utc::now().to_rfc3339()
    );

    Ok(())
}
