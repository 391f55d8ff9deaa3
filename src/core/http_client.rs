use std::path::{Path, PathBuf};
use std::time::Duration;

use mediagrab_core::platforms::strategy::DEFAULT_USER_AGENT;

pub const THUMBNAIL_FILE: &str = "thumb.jpg";

pub fn build_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(DEFAULT_USER_AGENT)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Best-effort preview image download. Any failure yields `None`; delivery
/// simply goes out without a thumbnail.
pub async fn fetch_thumbnail(
    client: &reqwest::Client,
    url: &str,
    dest_dir: &Path,
) -> Option<PathBuf> {
    match try_fetch(client, url, dest_dir).await {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!("Thumbnail fetch failed for {}: {:#}", url, e);
            None
        }
    }
}

async fn try_fetch(
    client: &reqwest::Client,
    url: &str,
    dest_dir: &Path,
) -> anyhow::Result<Option<PathBuf>> {
    let parsed = url::Url::parse(url)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Ok(None);
    }

    let response = client.get(parsed).send().await?;
    if response.status() != reqwest::StatusCode::OK {
        tracing::debug!("Thumbnail HTTP {} for {}", response.status(), url);
        return Ok(None);
    }

    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Ok(None);
    }

    let target = dest_dir.join(THUMBNAIL_FILE);
    tokio::fs::write(&target, &bytes).await?;
    Ok(Some(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn non_http_url_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let client = build_client(Duration::from_secs(1)).unwrap();
        let got = fetch_thumbnail(&client, "file:///etc/passwd", dir.path()).await;
        assert!(got.is_none());
        assert!(!dir.path().join(THUMBNAIL_FILE).exists());
    }

    #[tokio::test]
    async fn garbage_url_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let client = build_client(Duration::from_secs(1)).unwrap();
        assert!(fetch_thumbnail(&client, "not a url", dir.path()).await.is_none());
    }

    #[tokio::test]
    async fn unreachable_host_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let client = build_client(Duration::from_millis(500)).unwrap();
        let got = fetch_thumbnail(&client, "http://127.0.0.1:1/thumb.jpg", dir.path()).await;
        assert!(got.is_none());
    }
}
