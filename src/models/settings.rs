use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub auto_install_ytdlp: bool,
    #[serde(default = "default_thumbnail_timeout_secs")]
    pub thumbnail_timeout_secs: u64,
    #[serde(default)]
    pub workspace_root: Option<PathBuf>,
    #[serde(default = "default_bot_username")]
    pub bot_username: String,
    /// Persistent log next to the console output; `null` turns it off.
    #[serde(default = "default_log_file")]
    pub log_file: Option<PathBuf>,
}

fn default_output_dir() -> PathBuf {
    dirs::download_dir()
        .map(|d| d.join("mediagrab"))
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn default_log_file() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("mediagrab").join("logs").join("mediagrab.log"))
}

fn default_true() -> bool {
    true
}

fn default_thumbnail_timeout_secs() -> u64 {
    10
}

fn default_bot_username() -> String {
    "@mediagrab".into()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            ytdlp_path: None,
            auto_install_ytdlp: true,
            thumbnail_timeout_secs: default_thumbnail_timeout_secs(),
            workspace_root: None,
            bot_username: default_bot_username(),
            log_file: default_log_file(),
        }
    }
}
