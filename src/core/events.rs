use async_trait::async_trait;
use mediagrab_core::models::download::ProgressSnapshot;
use mediagrab_core::{PlatformInfo, ProgressSink};
use tokio::sync::mpsc;

use crate::core::messages;

/// One line of conversation output, tagged with the link it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub job: Option<u64>,
    pub text: String,
}

pub type Outbox = mpsc::UnboundedSender<Reply>;

pub fn send(outbox: &Outbox, job: Option<u64>, text: impl Into<String>) {
    let _ = outbox.send(Reply {
        job,
        text: text.into(),
    });
}

/// Edits the per-link status message: each throttled snapshot becomes a
/// fresh progress card on the outbox.
pub struct StatusSink {
    job: u64,
    info: &'static PlatformInfo,
    outbox: Outbox,
}

impl StatusSink {
    pub fn new(job: u64, info: &'static PlatformInfo, outbox: Outbox) -> Self {
        Self { job, info, outbox }
    }
}

#[async_trait]
impl ProgressSink for StatusSink {
    async fn emit(&self, snapshot: ProgressSnapshot) -> anyhow::Result<()> {
        self.outbox.send(Reply {
            job: Some(self.job),
            text: messages::progress_card(self.info, &snapshot),
        })?;
        Ok(())
    }
}
