use std::sync::Arc;

use mediagrab_core::error::truncate_message;
use mediagrab_core::{classify, FailureKind, JobError};
use tracing::{info, warn};

use crate::core::delivery::{deliver, DeliveryMode, VideoUpload};
use crate::core::events::{send, StatusSink};
use crate::core::http_client::fetch_thumbnail;
use crate::core::messages;
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Rejected,
    Failed(FailureKind),
    Delivered(DeliveryMode),
    DeliveryFailed,
}

/// Drives one link from status card to delivered file. Every path ends with
/// a reply on the outbox and the job workspace removed.
pub async fn handle_link(state: &AppState, job: u64, url: &str) -> LinkOutcome {
    let Some(platform) = classify(url) else {
        send(
            &state.outbox,
            Some(job),
            messages::error_card(&JobError::UnrecognizedPlatform.to_string()),
        );
        return LinkOutcome::Rejected;
    };

    send(&state.outbox, Some(job), messages::preparing_card(platform));

    let sink = Arc::new(StatusSink::new(job, platform, state.outbox.clone()));
    let completed = state.orchestrator.execute(url, sink).await;

    let outcome = match &completed.result {
        Err(e) => {
            send(&state.outbox, Some(job), messages::error_card(&e.to_string()));
            LinkOutcome::Failed(e.kind())
        }
        Ok(artifact) => {
            send(&state.outbox, Some(job), "✅ Ready! Sending...");

            let thumbnail = match (&artifact.thumbnail_url, completed.workspace()) {
                (Some(thumb_url), Some(dir)) => fetch_thumbnail(&state.http, thumb_url, dir).await,
                _ => None,
            };

            let upload = VideoUpload {
                path: artifact.file_path.clone(),
                caption: messages::success_caption(artifact, &state.settings.bot_username),
                thumbnail,
                duration_seconds: artifact.duration_seconds,
            };

            match deliver(state.delivery.as_ref(), &upload).await {
                Ok(mode) => {
                    info!("Job {} delivered as {:?}", job, mode);
                    send(&state.outbox, Some(job), upload.caption);
                    LinkOutcome::Delivered(mode)
                }
                Err(e) => {
                    warn!("Job {} delivery failed: {:#}", job, e);
                    let message = truncate_message(&format!("{:#}", e));
                    send(&state.outbox, Some(job), messages::error_card(&message));
                    LinkOutcome::DeliveryFailed
                }
            }
        }
    };

    if let Err(e) = completed.close() {
        warn!("Failed to remove workspace for job {}: {}", job, e);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::delivery::DirectoryDelivery;
    use crate::core::events::Reply;
    use crate::models::settings::AppSettings;
    use mediagrab_core::models::media::MediaMetadata;
    use mediagrab_core::platforms::strategy::RetrievalRequest;
    use mediagrab_core::platforms::traits::{Extractor, ProgressCallback};
    use tokio::sync::mpsc;

    struct WriteFile {
        name: &'static str,
        size: u64,
    }

    impl Extractor for WriteFile {
        fn name(&self) -> &str {
            "write-file"
        }

        fn extract(
            &self,
            request: &RetrievalRequest,
            _progress: ProgressCallback<'_>,
        ) -> anyhow::Result<MediaMetadata> {
            let file = std::fs::File::create(request.destination_dir.join(self.name))?;
            file.set_len(self.size)?;
            Ok(MediaMetadata {
                title: Some("Clip".to_string()),
                duration_seconds: Some(9.0),
                ext: self.name.rsplit('.').next().map(|e| e.to_string()),
                ..Default::default()
            })
        }
    }

    fn state(
        extractor: WriteFile,
        output: &std::path::Path,
        workspaces: &std::path::Path,
    ) -> (AppState, mpsc::UnboundedReceiver<Reply>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let settings = AppSettings {
            output_dir: output.to_path_buf(),
            workspace_root: Some(workspaces.to_path_buf()),
            ..AppSettings::default()
        };
        let delivery = Arc::new(DirectoryDelivery::new(output));
        let state = AppState::new(settings, Arc::new(extractor), delivery, tx).unwrap();
        (state, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Reply>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(reply) = rx.try_recv() {
            out.push(reply.text);
        }
        out
    }

    #[tokio::test]
    async fn unknown_link_is_rejected() {
        let out = tempfile::tempdir().unwrap();
        let ws = tempfile::tempdir().unwrap();
        let (state, mut rx) = state(WriteFile { name: "a.mp4", size: 1 }, out.path(), ws.path());

        let outcome = handle_link(&state, 1, "https://example.com/v").await;

        assert_eq!(outcome, LinkOutcome::Rejected);
        let replies = drain(&mut rx);
        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains("Unknown platform or invalid link."));
        assert_eq!(state.orchestrator.stats().snapshot().total_attempts, 0);
    }

    #[tokio::test]
    async fn mp4_delivered_and_workspace_removed() {
        let out = tempfile::tempdir().unwrap();
        let ws = tempfile::tempdir().unwrap();
        let (state, mut rx) =
            state(WriteFile { name: "clip.mp4", size: 1024 }, out.path(), ws.path());

        let outcome = handle_link(&state, 2, "https://youtu.be/abc").await;

        assert_eq!(outcome, LinkOutcome::Delivered(DeliveryMode::Video));
        assert!(out.path().join("clip.mp4").exists());
        assert_eq!(std::fs::read_dir(ws.path()).unwrap().count(), 0);

        let replies = drain(&mut rx);
        assert!(replies.first().unwrap().starts_with("🎬 YouTube"));
        assert!(replies.last().unwrap().contains("⏱ 00:09"));

        let stats = state.orchestrator.stats().snapshot();
        assert_eq!((stats.total_attempts, stats.successes), (1, 1));
    }

    #[tokio::test]
    async fn webm_delivered_as_document() {
        let out = tempfile::tempdir().unwrap();
        let ws = tempfile::tempdir().unwrap();
        let (state, _rx) = state(WriteFile { name: "clip.webm", size: 10 }, out.path(), ws.path());

        let outcome = handle_link(&state, 3, "https://x.com/u/status/1").await;
        assert_eq!(outcome, LinkOutcome::Delivered(DeliveryMode::Document));
    }

    #[tokio::test]
    async fn oversized_file_reports_error() {
        let out = tempfile::tempdir().unwrap();
        let ws = tempfile::tempdir().unwrap();
        let size = mediagrab_core::DELIVERY_SIZE_LIMIT + 1;
        let (state, mut rx) = state(WriteFile { name: "big.mp4", size }, out.path(), ws.path());

        let outcome = handle_link(&state, 4, "https://tiktok.com/@u/video/1").await;

        assert_eq!(outcome, LinkOutcome::Failed(FailureKind::ArtifactTooLarge));
        assert!(drain(&mut rx).last().unwrap().contains("File too large"));
        assert!(!out.path().join("big.mp4").exists());
        assert_eq!(std::fs::read_dir(ws.path()).unwrap().count(), 0);
        assert_eq!(state.orchestrator.stats().snapshot().failures, 1);
    }
}
