pub mod strategy;
pub mod traits;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    YouTube,
    Facebook,
    TikTok,
    Twitter,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformInfo {
    pub key: Platform,
    pub display_name: &'static str,
    pub emoji: &'static str,
    pub domains: &'static [&'static str],
}

/// Lookup order matters: the first platform owning a matching domain wins.
pub static PLATFORMS: [PlatformInfo; 5] = [
    PlatformInfo {
        key: Platform::Instagram,
        display_name: "Instagram",
        emoji: "📸",
        domains: &["instagram.com", "instagr.am"],
    },
    PlatformInfo {
        key: Platform::YouTube,
        display_name: "YouTube",
        emoji: "🎬",
        domains: &["youtube.com", "youtu.be", "m.youtube.com"],
    },
    PlatformInfo {
        key: Platform::Facebook,
        display_name: "Facebook",
        emoji: "📘",
        domains: &["facebook.com", "fb.com", "fb.watch", "m.facebook.com"],
    },
    PlatformInfo {
        key: Platform::TikTok,
        display_name: "TikTok",
        emoji: "🎵",
        domains: &["tiktok.com", "vm.tiktok.com", "vt.tiktok.com"],
    },
    PlatformInfo {
        key: Platform::Twitter,
        display_name: "Twitter/X",
        emoji: "🐦",
        domains: &["twitter.com", "x.com", "t.co"],
    },
];

impl Platform {
    pub fn info(self) -> &'static PlatformInfo {
        PLATFORMS
            .iter()
            .find(|p| p.key == self)
            .unwrap_or(&PLATFORMS[0])
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::YouTube => "youtube",
            Platform::Facebook => "facebook",
            Platform::TikTok => "tiktok",
            Platform::Twitter => "twitter",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        PLATFORMS
            .iter()
            .map(|p| p.key)
            .find(|p| p.as_str().eq_ignore_ascii_case(key))
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PlatformInfo {
    /// Short label used in status lines, e.g. `🎵 TikTok`.
    pub fn label(&self) -> String {
        format!("{} {}", self.emoji, self.display_name)
    }

    pub fn example_link(&self) -> String {
        format!("{}/...", self.domains.first().copied().unwrap_or("example.com"))
    }
}

/// Maps a raw link to its platform by case-insensitive domain substring.
/// Returns `None` for anything unrecognized; never fails.
pub fn classify(url: &str) -> Option<&'static PlatformInfo> {
    let url = url.to_lowercase();
    PLATFORMS
        .iter()
        .find(|p| p.domains.iter().any(|d| url.contains(d)))
}
