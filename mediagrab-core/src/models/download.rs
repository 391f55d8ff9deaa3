use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    Pending,
    Downloading,
    Complete,
}

/// Raw progress as reported by the extraction worker. Zero means unknown for
/// both `total_bytes` and `speed_bps`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub status: DownloadStatus,
    pub downloaded_bytes: u64,
    pub total_bytes: u64,
    pub speed_bps: u64,
}

impl ProgressSnapshot {
    pub fn downloading(downloaded_bytes: u64, total_bytes: u64, speed_bps: u64) -> Self {
        Self {
            status: DownloadStatus::Downloading,
            downloaded_bytes,
            total_bytes,
            speed_bps,
        }
    }

    /// `None` while the total size is unknown.
    pub fn percent(&self) -> Option<u8> {
        if self.total_bytes == 0 {
            return None;
        }
        let pct = (self.downloaded_bytes as u128 * 100) / self.total_bytes as u128;
        Some(pct.min(100) as u8)
    }

    /// Number of filled cells in a bar of `segments` cells.
    pub fn filled_segments(&self, segments: usize) -> usize {
        let percent = self.percent().unwrap_or(0) as usize;
        percent * segments / 100
    }
}
