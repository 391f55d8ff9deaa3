use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

/// Playable-media upload as the channel sees it.
#[derive(Debug, Clone)]
pub struct VideoUpload {
    pub path: PathBuf,
    pub caption: String,
    pub thumbnail: Option<PathBuf>,
    pub duration_seconds: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    Video,
    Document,
}

#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn send_video(&self, upload: &VideoUpload) -> anyhow::Result<()>;

    async fn send_document(&self, path: &Path, caption: &str) -> anyhow::Result<()>;
}

/// Sends as playable media and falls back to a generic document when the
/// channel rejects that.
pub async fn deliver(
    channel: &dyn DeliveryChannel,
    upload: &VideoUpload,
) -> anyhow::Result<DeliveryMode> {
    match channel.send_video(upload).await {
        Ok(()) => Ok(DeliveryMode::Video),
        Err(e) => {
            tracing::info!("Video delivery rejected, sending as document: {:#}", e);
            channel
                .send_document(&upload.path, &upload.caption)
                .await
                .context("document delivery failed")?;
            Ok(DeliveryMode::Document)
        }
    }
}

/// Delivers into a local directory. Only MP4 counts as playable media; the
/// caption is stored next to the file as `<name>.txt`.
pub struct DirectoryDelivery {
    output_dir: PathBuf,
}

impl DirectoryDelivery {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    async fn store(&self, source: &Path, caption: &str) -> anyhow::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("creating {}", self.output_dir.display()))?;

        let name = source
            .file_name()
            .ok_or_else(|| anyhow!("artifact has no file name"))?;
        let (target, mut dest) = claim_path(&self.output_dir.join(name)).await?;

        let copied = async {
            let mut src = tokio::fs::File::open(source).await?;
            tokio::io::copy(&mut src, &mut dest).await?;
            dest.flush().await
        }
        .await;
        if let Err(e) = copied {
            let _ = tokio::fs::remove_file(&target).await;
            return Err(e).with_context(|| format!("copying to {}", target.display()));
        }

        let mut caption_path = target.clone().into_os_string();
        caption_path.push(".txt");
        tokio::fs::write(PathBuf::from(caption_path), caption).await?;

        tracing::info!("Delivered {}", target.display());
        Ok(target)
    }
}

#[async_trait]
impl DeliveryChannel for DirectoryDelivery {
    async fn send_video(&self, upload: &VideoUpload) -> anyhow::Result<()> {
        let playable = upload
            .path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("mp4"));
        if !playable {
            return Err(anyhow!(
                "{} is not playable media",
                upload.path.display()
            ));
        }

        let target = self.store(&upload.path, &upload.caption).await?;

        if let Some(thumb) = &upload.thumbnail {
            let thumb_target = target.with_extension("jpg");
            if let Err(e) = tokio::fs::copy(thumb, &thumb_target).await {
                tracing::debug!("Skipping thumbnail: {}", e);
            }
        }
        Ok(())
    }

    async fn send_document(&self, path: &Path, caption: &str) -> anyhow::Result<()> {
        self.store(path, caption).await.map(|_| ())
    }
}

/// Creates the first of `name.ext`, `name (1).ext`, `name (2).ext`... that
/// does not exist yet. Creation is exclusive, so concurrent deliveries of the
/// same name never end up sharing a target.
async fn claim_path(candidate: &Path) -> anyhow::Result<(PathBuf, tokio::fs::File)> {
    let stem = candidate
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = candidate
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 0u32;
    loop {
        let next = if n == 0 {
            candidate.to_path_buf()
        } else {
            candidate.with_file_name(format!("{} ({}){}", stem, n, ext))
        };
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&next)
            .await
        {
            Ok(file) => return Ok((next, file)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => n += 1,
            Err(e) => {
                return Err(e).with_context(|| format!("creating {}", next.display()));
            }
        }
    }
}
