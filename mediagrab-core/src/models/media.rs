use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::platforms::Platform;

/// Metadata record returned by the extraction capability after a successful
/// fetch. Every field is optional because extractors fill them unevenly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub title: Option<String>,
    pub duration_seconds: Option<f64>,
    pub thumbnail_url: Option<String>,
    pub uploader: Option<String>,
    pub view_count: Option<u64>,
    pub ext: Option<String>,
}

/// A downloaded file that passed post-download policy.
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    pub platform: Platform,
    pub file_path: PathBuf,
    pub title: String,
    pub size_bytes: u64,
    pub duration_seconds: u32,
    pub thumbnail_url: Option<String>,
    pub uploader: Option<String>,
    pub view_count: Option<u64>,
    pub ext: Option<String>,
}

pub(crate) fn round_duration(seconds: Option<f64>) -> u32 {
    match seconds {
        Some(s) if s.is_finite() && s > 0.0 => s.round().min(u32::MAX as f64) as u32,
        _ => 0,
    }
}
