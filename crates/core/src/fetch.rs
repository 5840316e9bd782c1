use crate::error::IngestError;
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tracing::{info, warn};
use url::Url;

/// Temp file location for a downloaded PDF. The name carries the process id
/// and a digest of the URL so concurrent invocations never collide, and so
/// cleanup can recompute the path from the URL alone.
pub fn temp_pdf_path(url: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    std::env::temp_dir().join(format!(
        "rag_pdf_{}_{}.pdf",
        std::process::id(),
        &digest[..16]
    ))
}

/// Downloads one PDF and persists it to its temp path. A non-success status
/// aborts the whole run; there is no per-URL isolation or retry.
pub async fn download_pdf(client: &Client, url: &str) -> Result<PathBuf, IngestError> {
    Url::parse(url)
        .map_err(|error| IngestError::InvalidArgument(format!("invalid pdf url {url}: {error}")))?;

    info!(url = %preview(url), "downloading pdf");
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(IngestError::Fetch {
            url: url.to_string(),
            status,
        });
    }

    let bytes = response.bytes().await?;
    let path = temp_pdf_path(url);
    tokio::fs::write(&path, &bytes).await?;
    info!(path = %path.display(), bytes = bytes.len(), "saved temp pdf");

    Ok(path)
}

/// Best-effort removal of every temp file the given URLs map to. Missing
/// files are expected (an earlier failure may have stopped the run before
/// some downloads); other failures are logged and swallowed.
pub async fn cleanup_temp_files(urls: &[String]) {
    for url in urls {
        let path = temp_pdf_path(url);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to remove temp pdf");
            }
        }
    }
}

fn preview(url: &str) -> String {
    url.chars().take(80).collect()
}
