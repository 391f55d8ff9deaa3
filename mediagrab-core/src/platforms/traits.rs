use crate::models::download::ProgressSnapshot;
use crate::models::media::MediaMetadata;
use crate::platforms::strategy::RetrievalRequest;

pub type ProgressCallback<'a> = &'a (dyn Fn(ProgressSnapshot) + Send + Sync);

/// Resolves a link to a media file on disk. Implementations block the calling
/// thread for the whole fetch and must write exactly one primary media file
/// into `request.destination_dir`. `progress` may be called any number of
/// times from the calling thread.
pub trait Extractor: Send + Sync {
    fn name(&self) -> &str;

    fn extract(
        &self,
        request: &RetrievalRequest,
        progress: ProgressCallback<'_>,
    ) -> anyhow::Result<MediaMetadata>;
}
