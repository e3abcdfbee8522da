//! First-run download of missing data files.
//!
//! If a data file is absent and a source URL is configured, it is fetched
//! once before loading. There is no retry: the download either succeeds or
//! startup halts.

use crate::error::{DataLoadError, Result};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::info;

/// A data file and where to fetch it from when it's missing
#[derive(Debug, Clone)]
pub struct DataSource {
    pub path: PathBuf,
    pub url: Option<String>,
}

impl DataSource {
    pub fn new(path: impl Into<PathBuf>, url: Option<String>) -> Self {
        Self {
            path: path.into(),
            url,
        }
    }
}

/// Make sure `source.path` exists, downloading it if needed.
///
/// Returns `true` if the file was downloaded, `false` if it was already there.
pub async fn ensure_file(client: &reqwest::Client, source: &DataSource) -> Result<bool> {
    if tokio::fs::try_exists(&source.path).await? {
        return Ok(false);
    }

    let url = source
        .url
        .as_deref()
        .ok_or_else(|| DataLoadError::FileNotFound {
            path: source.path.display().to_string(),
        })?;

    info!(url = %url, path = %source.path.display(), "Data file missing, downloading");
    download(client, url, &source.path).await?;
    Ok(true)
}

/// Stream `url` into a sibling `.part` file, then rename it into place so a
/// failed download never leaves a truncated data file behind.
async fn download(client: &reqwest::Client, url: &str, path: &Path) -> Result<()> {
    let failed = |reason: String| DataLoadError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| failed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(failed(format!("server returned {}", response.status())));
    }

    let partial = partial_path(path);
    match write_partial(&mut response, url, &partial, path).await {
        Ok(written) => {
            info!(bytes = written, path = %path.display(), "Download complete");
            Ok(())
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&partial).await;
            Err(e)
        }
    }
}

/// Write the response body to `partial` and move it to `path`.
/// `partial` may be left behind on error; the caller removes it.
async fn write_partial(
    response: &mut reqwest::Response,
    url: &str,
    partial: &Path,
    path: &Path,
) -> Result<u64> {
    let mut file = tokio::fs::File::create(partial).await?;
    let mut written: u64 = 0;

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| DataLoadError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?
    {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    drop(file);
    tokio::fs::rename(partial, path).await?;
    Ok(written)
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}
