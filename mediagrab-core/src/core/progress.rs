use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::runtime::Handle;

use crate::core::events::ProgressSink;
use crate::models::download::{DownloadStatus, ProgressSnapshot};

pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(1200);

pub struct ProgressThrottle {
    last_emit: Option<Instant>,
    min_interval: Duration,
}

impl ProgressThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_emit: None,
            min_interval,
        }
    }

    pub fn should_emit_at(&mut self, now: Instant) -> bool {
        match self.last_emit {
            Some(last) if now.saturating_duration_since(last) < self.min_interval => false,
            _ => {
                self.last_emit = Some(now);
                true
            }
        }
    }
}

struct BridgeState {
    throttle: ProgressThrottle,
    high_water: u64,
}

/// Hands progress from a blocking worker thread to an async sink at a bounded
/// rate. `report` never blocks on the sink: accepted snapshots are spawned
/// onto the runtime and the worker moves on.
pub struct ProgressBridge {
    handle: Handle,
    sink: Arc<dyn ProgressSink>,
    state: Mutex<BridgeState>,
}

impl ProgressBridge {
    pub fn new(handle: Handle, sink: Arc<dyn ProgressSink>) -> Self {
        Self::with_interval(handle, sink, PROGRESS_INTERVAL)
    }

    pub fn with_interval(handle: Handle, sink: Arc<dyn ProgressSink>, interval: Duration) -> Self {
        Self {
            handle,
            sink,
            state: Mutex::new(BridgeState {
                throttle: ProgressThrottle::new(interval),
                high_water: 0,
            }),
        }
    }

    pub fn report(&self, snapshot: ProgressSnapshot) {
        self.report_at(snapshot, Instant::now());
    }

    /// Returns whether the snapshot was forwarded to the sink.
    pub fn report_at(&self, snapshot: ProgressSnapshot, now: Instant) -> bool {
        if snapshot.status != DownloadStatus::Downloading {
            return false;
        }

        {
            let mut state = match self.state.lock() {
                Ok(s) => s,
                Err(poisoned) => poisoned.into_inner(),
            };
            // Merged formats restart the byte counter for the second stream.
            if snapshot.downloaded_bytes < state.high_water {
                return false;
            }
            if !state.throttle.should_emit_at(now) {
                return false;
            }
            state.high_water = snapshot.downloaded_bytes;
        }

        let sink = self.sink.clone();
        self.handle.spawn(async move {
            if let Err(e) = sink.emit(snapshot).await {
                tracing::debug!("Progress update error: {:#}", e);
            }
        });
        true
    }
}
