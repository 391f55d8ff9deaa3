use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::platforms::Platform;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
pub const OUTPUT_TEMPLATE: &str = "%(title).200s.%(ext)s";
pub const RETRIES: u32 = 3;
pub const FRAGMENT_RETRIES: u32 = 3;
pub const SOCKET_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NetworkFlag {
    GeoBypass,
    /// Extractor login preference, e.g. `guest` for public Instagram posts.
    PreferredLogin(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetrievalStrategy {
    pub platform: Option<Platform>,
    pub format_selector: &'static str,
    pub network_flags: &'static [NetworkFlag],
}

pub fn geo_bypass(flags: &[NetworkFlag]) -> bool {
    flags.contains(&NetworkFlag::GeoBypass)
}

pub fn preferred_login(flags: &[NetworkFlag]) -> Option<&'static str> {
    flags.iter().find_map(|f| match f {
        NetworkFlag::PreferredLogin(mode) => Some(*mode),
        _ => None,
    })
}

pub static DEFAULT_STRATEGY: RetrievalStrategy = RetrievalStrategy {
    platform: None,
    format_selector: "best[ext=mp4]/best",
    network_flags: &[],
};

static STRATEGIES: &[RetrievalStrategy] = &[
    RetrievalStrategy {
        platform: Some(Platform::YouTube),
        format_selector: "bestvideo[ext=mp4][height<=1080]+bestaudio[ext=m4a]/best[ext=mp4]/best",
        network_flags: &[],
    },
    RetrievalStrategy {
        platform: Some(Platform::Instagram),
        format_selector: "best",
        network_flags: &[NetworkFlag::PreferredLogin("guest")],
    },
    RetrievalStrategy {
        platform: Some(Platform::Facebook),
        format_selector: "best",
        network_flags: &[NetworkFlag::GeoBypass],
    },
    RetrievalStrategy {
        platform: Some(Platform::TikTok),
        format_selector: "best[ext=mp4]/best",
        network_flags: &[NetworkFlag::GeoBypass],
    },
    RetrievalStrategy {
        platform: Some(Platform::Twitter),
        format_selector: "best",
        network_flags: &[NetworkFlag::GeoBypass],
    },
];

pub fn strategy_for(platform: Platform) -> &'static RetrievalStrategy {
    lookup(STRATEGIES, platform)
}

fn lookup(table: &'static [RetrievalStrategy], platform: Platform) -> &'static RetrievalStrategy {
    table
        .iter()
        .find(|s| s.platform == Some(platform))
        .unwrap_or(&DEFAULT_STRATEGY)
}

/// Everything the extraction capability needs for one blocking fetch.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalRequest {
    pub platform: Platform,
    pub url: String,
    pub destination_dir: PathBuf,
    pub output_template: PathBuf,
    pub format_selector: String,
    pub network_flags: Vec<NetworkFlag>,
    pub headers: Vec<(String, String)>,
    pub retries: u32,
    pub fragment_retries: u32,
    pub socket_timeout: Duration,
    pub no_playlist: bool,
}

impl RetrievalRequest {
    pub fn new(
        platform: Platform,
        url: &str,
        destination_dir: &Path,
        strategy: &RetrievalStrategy,
    ) -> Self {
        Self {
            platform,
            url: url.to_string(),
            destination_dir: destination_dir.to_path_buf(),
            output_template: destination_dir.join(OUTPUT_TEMPLATE),
            format_selector: strategy.format_selector.to_string(),
            network_flags: strategy.network_flags.to_vec(),
            headers: vec![
                ("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string()),
                ("Accept-Language".to_string(), DEFAULT_ACCEPT_LANGUAGE.to_string()),
                ("Referer".to_string(), url.to_string()),
            ],
            retries: RETRIES,
            fragment_retries: FRAGMENT_RETRIES,
            socket_timeout: SOCKET_TIMEOUT,
            no_playlist: true,
        }
    }

    pub fn geo_bypass(&self) -> bool {
        geo_bypass(&self.network_flags)
    }

    pub fn preferred_login(&self) -> Option<&'static str> {
        preferred_login(&self.network_flags)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
