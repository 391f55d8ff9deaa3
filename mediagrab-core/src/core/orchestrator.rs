use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

use crate::core::artifact::locate_artifact;
use crate::core::events::ProgressSink;
use crate::core::filename::sanitize_title;
use crate::core::progress::{ProgressBridge, PROGRESS_INTERVAL};
use crate::core::stats::Stats;
use crate::error::{FailureKind, JobError};
use crate::models::media::{round_duration, Artifact};
use crate::platforms::strategy::{strategy_for, RetrievalRequest};
use crate::platforms::traits::Extractor;
use crate::platforms::{classify, PlatformInfo};

/// Largest file the delivery channel accepts.
pub const DELIVERY_SIZE_LIMIT: u64 = 50 * 1024 * 1024;
pub const WORKSPACE_PREFIX: &str = "video_dl_";

pub type JobResult = Result<Artifact, JobError>;

/// Terminal result of a scoped job together with the temporary directory that
/// holds its artifact. The directory is removed when this value is dropped or
/// closed, whatever the result.
pub struct CompletedJob {
    pub result: JobResult,
    workspace: Option<TempDir>,
}

impl CompletedJob {
    pub fn workspace(&self) -> Option<&Path> {
        self.workspace.as_ref().map(|w| w.path())
    }

    pub fn close(self) -> std::io::Result<()> {
        match self.workspace {
            Some(w) => w.close(),
            None => Ok(()),
        }
    }
}

pub struct Orchestrator {
    extractor: Arc<dyn Extractor>,
    stats: Arc<Stats>,
    progress_interval: Duration,
    workspace_root: Option<PathBuf>,
}

impl Orchestrator {
    pub fn new(extractor: Arc<dyn Extractor>, stats: Arc<Stats>) -> Self {
        Self {
            extractor,
            stats,
            progress_interval: PROGRESS_INTERVAL,
            workspace_root: None,
        }
    }

    /// Parent directory for per-job workspaces; the system temp dir otherwise.
    pub fn with_workspace_root(mut self, root: PathBuf) -> Self {
        self.workspace_root = Some(root);
        self
    }

    pub fn stats(&self) -> &Arc<Stats> {
        &self.stats
    }

    /// Runs one job inside a fresh temporary workspace. Unrecognized links
    /// are rejected before any directory is created.
    pub async fn execute(&self, url: &str, sink: Arc<dyn ProgressSink>) -> CompletedJob {
        let info = match classify(url) {
            Some(info) => info,
            None => {
                debug!("Rejected unrecognized link: {}", url);
                return CompletedJob {
                    result: Err(JobError::UnrecognizedPlatform),
                    workspace: None,
                };
            }
        };

        let workspace = match self.create_workspace() {
            Ok(w) => w,
            Err(e) => {
                error!("Failed to create job workspace: {}", e);
                self.stats.record_attempt();
                self.stats.record_failure();
                return CompletedJob {
                    result: Err(JobError::retrieval(format!(
                        "failed to create workspace: {}",
                        e
                    ))),
                    workspace: None,
                };
            }
        };

        let result = self.run_classified(info, url, sink, workspace.path()).await;
        CompletedJob {
            result,
            workspace: Some(workspace),
        }
    }

    /// Runs one job writing into a caller-owned `destination_dir`. Never
    /// panics and never returns anything but a terminal result.
    pub async fn run(
        &self,
        url: &str,
        sink: Arc<dyn ProgressSink>,
        destination_dir: &Path,
    ) -> JobResult {
        match classify(url) {
            Some(info) => self.run_classified(info, url, sink, destination_dir).await,
            None => {
                debug!("Rejected unrecognized link: {}", url);
                Err(JobError::UnrecognizedPlatform)
            }
        }
    }

    fn create_workspace(&self) -> std::io::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        match &self.workspace_root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
    }

    async fn run_classified(
        &self,
        info: &'static PlatformInfo,
        url: &str,
        sink: Arc<dyn ProgressSink>,
        destination_dir: &Path,
    ) -> JobResult {
        let span = tracing::info_span!("job", id = %Uuid::new_v4(), platform = %info.key);

        async move {
            self.stats.record_attempt();
            info!("Starting retrieval: {}", url);

            let result = self.retrieve(info, url, sink, destination_dir).await;

            match &result {
                Ok(artifact) => {
                    self.stats.record_success();
                    info!(
                        "Retrieved '{}' ({} bytes)",
                        artifact.title, artifact.size_bytes
                    );
                }
                Err(e) => {
                    self.stats.record_failure();
                    match e.kind() {
                        FailureKind::ArtifactTooLarge => warn!("{}", e),
                        _ => error!("Retrieval failed: {}", e),
                    }
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn retrieve(
        &self,
        info: &'static PlatformInfo,
        url: &str,
        sink: Arc<dyn ProgressSink>,
        destination_dir: &Path,
    ) -> JobResult {
        let request =
            RetrievalRequest::new(info.key, url, destination_dir, strategy_for(info.key));
        let bridge = ProgressBridge::with_interval(Handle::current(), sink, self.progress_interval);
        let extractor = self.extractor.clone();

        debug!("Dispatching to extractor '{}'", extractor.name());
        let metadata = tokio::task::spawn_blocking(move || {
            extractor.extract(&request, &|snapshot| bridge.report(snapshot))
        })
        .await
        .map_err(JobError::retrieval)?
        .map_err(JobError::retrieval)?;

        let file_path = locate_artifact(destination_dir, metadata.ext.as_deref())
            .await
            .map_err(|e| {
                warn!("Could not scan {:?}: {}", destination_dir, e);
                JobError::ArtifactMissing
            })?
            .ok_or(JobError::ArtifactMissing)?;

        let size_bytes = tokio::fs::metadata(&file_path)
            .await
            .map_err(|_| JobError::ArtifactMissing)?
            .len();

        if size_bytes > DELIVERY_SIZE_LIMIT {
            return Err(JobError::ArtifactTooLarge {
                size: size_bytes,
                limit: DELIVERY_SIZE_LIMIT,
            });
        }

        Ok(Artifact {
            platform: info.key,
            file_path,
            title: sanitize_title(metadata.title.as_deref()),
            size_bytes,
            duration_seconds: round_duration(metadata.duration_seconds),
            thumbnail_url: metadata.thumbnail_url.filter(|t| !t.is_empty()),
            uploader: metadata.uploader.filter(|u| !u.is_empty()),
            view_count: metadata.view_count,
            ext: metadata.ext,
        })
    }
}
