use async_trait::async_trait;

use crate::models::download::ProgressSnapshot;

/// Receiver of throttled progress updates, typically a status message that
/// gets edited in place. Failures are logged by the caller and otherwise
/// ignored.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn emit(&self, snapshot: ProgressSnapshot) -> anyhow::Result<()>;
}

/// Sink that drops every update.
pub struct NullSink;

#[async_trait]
impl ProgressSink for NullSink {
    async fn emit(&self, _snapshot: ProgressSnapshot) -> anyhow::Result<()> {
        Ok(())
    }
}
