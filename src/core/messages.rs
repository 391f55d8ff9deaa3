use chrono::{DateTime, Utc};
use mediagrab_core::core::format::format_size;
use mediagrab_core::models::download::ProgressSnapshot;
use mediagrab_core::models::media::Artifact;
use mediagrab_core::{PlatformInfo, StatsSnapshot, DELIVERY_SIZE_LIMIT};
use mediagrab_core::platforms::PLATFORMS;

pub const BAR_SEGMENTS: usize = 10;
const FILLED: &str = "🔵";
const EMPTY: &str = "◻️";

pub const UNEXPECTED_ERROR: &str = "❌ Something went wrong.\nPlease try again.";

pub fn format_duration(seconds: u32) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{:02}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

/// `1234567` -> `1,234,567`
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn progress_bar(snapshot: &ProgressSnapshot) -> String {
    let filled = snapshot.filled_segments(BAR_SEGMENTS);
    format!("{}{}", FILLED.repeat(filled), EMPTY.repeat(BAR_SEGMENTS - filled))
}

pub fn preparing_card(info: &PlatformInfo) -> String {
    format!("{}\n\n⏳ Preparing, please wait...", info.label())
}

pub fn progress_card(info: &PlatformInfo, snapshot: &ProgressSnapshot) -> String {
    let speed = if snapshot.speed_bps > 0 {
        format!("{}/s", format_size(snapshot.speed_bps))
    } else {
        "—".to_string()
    };
    // Without a known total there is nothing to measure a percentage against.
    let amount = match snapshot.percent() {
        Some(percent) => format!(
            "{} {}%\n📥 {} / {}",
            progress_bar(snapshot),
            percent,
            format_size(snapshot.downloaded_bytes),
            format_size(snapshot.total_bytes),
        ),
        None => format!("📥 {}", format_size(snapshot.downloaded_bytes)),
    };
    format!(
        "{}\n\n{}\n⚡ Speed: {}\n⏳ Downloading...",
        info.label(),
        amount,
        speed,
    )
}

pub fn success_caption(artifact: &Artifact, bot_username: &str) -> String {
    let mut text = format!(
        "✅ Downloaded\n\n🎬 {}\n📦 {}   ⏱ {}\n",
        artifact.title,
        format_size(artifact.size_bytes),
        format_duration(artifact.duration_seconds),
    );
    if let Some(uploader) = artifact.uploader.as_deref().filter(|u| !u.is_empty()) {
        text.push_str(&format!("👤 {}\n", uploader));
    }
    if let Some(views) = artifact.view_count.filter(|v| *v > 0) {
        text.push_str(&format!("👁 {} views\n", thousands(views)));
    }
    text.push_str(&format!(
        "\n{}\n\n© via {}",
        artifact.platform.info().label(),
        bot_username
    ));
    text
}

pub fn error_card(message: &str) -> String {
    format!(
        "❌ Error\n\n{}\n\n💡 Check the link or send a public video.",
        message
    )
}

pub fn stats_card(stats: &StatsSnapshot, now: DateTime<Utc>) -> String {
    let uptime = stats.uptime(now).num_seconds().max(0);
    let hours = uptime / 3600;
    let minutes = (uptime % 3600) / 60;
    format!(
        "📊 Statistics\n\n⏱ Uptime: {} h {} min\n📥 Total: {}\n✅ Succeeded: {}\n❌ Failed: {}\n📈 Success rate: {:.1}%",
        hours,
        minutes,
        stats.total_attempts,
        stats.successes,
        stats.failures,
        stats.success_rate(),
    )
}

pub fn start_text(bot_username: &str) -> String {
    let names: Vec<&str> = PLATFORMS.iter().map(|p| p.display_name).collect();
    format!(
        "✨ MediaGrab\n\n🎯 Fast and reliable: {}\n\n📲 Send a link and I'll fetch the video for you.\n\nBot: {}",
        names.join(", "),
        bot_username
    )
}

pub fn help_text() -> String {
    format!(
        "❓ How to use\n\n1) Send a video link.\n2) I download it and send it back.\n\n⚠️ Limit: files up to {}.\n🔒 Respect copyright.",
        format_size(DELIVERY_SIZE_LIMIT)
    )
}

pub fn platform_card(info: &PlatformInfo) -> String {
    format!("{}\n\nExample link:\n{}", info.label(), info.example_link())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use mediagrab_core::Platform;
    use std::path::PathBuf;

    fn artifact() -> Artifact {
        Artifact {
            platform: Platform::TikTok,
            file_path: PathBuf::from("/tmp/clip.mp4"),
            title: "Dance".to_string(),
            size_bytes: 2 * 1024 * 1024,
            duration_seconds: 75,
            thumbnail_url: None,
            uploader: Some("someone".to_string()),
            view_count: Some(1_234_567),
            ext: Some("mp4".to_string()),
        }
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(0), "00:00");
        assert_eq!(format_duration(75), "01:15");
        assert_eq!(format_duration(3_661), "01:01:01");
    }

    #[test]
    fn thousands_separator() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1_000), "1,000");
        assert_eq!(thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn bar_fills_by_tens() {
        let s = ProgressSnapshot::downloading(25, 100, 0);
        assert_eq!(progress_bar(&s), format!("{}{}", "🔵".repeat(2), "◻️".repeat(8)));
        let full = ProgressSnapshot::downloading(100, 100, 0);
        assert_eq!(progress_bar(&full), "🔵".repeat(10));
    }

    #[test]
    fn progress_card_unknown_total_has_no_percentage() {
        let info = Platform::YouTube.info();
        let card = progress_card(info, &ProgressSnapshot::downloading(5 * 1024 * 1024, 0, 0));
        assert!(card.starts_with("🎬 YouTube"));
        assert!(!card.contains('%'));
        assert!(!card.contains("◻️"));
        assert!(card.contains("📥 5.0 MB\n"));
        assert!(!card.contains(" / "));
        assert!(card.contains("Speed: —"));
        assert!(card.ends_with("Downloading..."));
    }

    #[test]
    fn progress_card_with_speed() {
        let info = Platform::TikTok.info();
        let card = progress_card(info, &ProgressSnapshot::downloading(1024, 4096, 1536));
        assert!(card.contains("🔵🔵◻️"));
        assert!(card.contains("25%"));
        assert!(card.contains("📥 1.0 KB / 4.0 KB"));
        assert!(card.contains("Speed: 1.5 KB/s"));
    }

    #[test]
    fn caption_has_all_fields() {
        let caption = success_caption(&artifact(), "@bot");
        assert!(caption.contains("🎬 Dance"));
        assert!(caption.contains("📦 2.0 MB"));
        assert!(caption.contains("⏱ 01:15"));
        assert!(caption.contains("👤 someone"));
        assert!(caption.contains("👁 1,234,567 views"));
        assert!(caption.contains("🎵 TikTok"));
        assert!(caption.ends_with("© via @bot"));
    }

    #[test]
    fn caption_skips_missing_fields() {
        let mut a = artifact();
        a.uploader = None;
        a.view_count = Some(0);
        let caption = success_caption(&a, "@bot");
        assert!(!caption.contains("👤"));
        assert!(!caption.contains("👁"));
    }

    #[test]
    fn stats_uptime_and_rate() {
        let start = Utc::now();
        let snapshot = StatsSnapshot {
            total_attempts: 3,
            successes: 2,
            failures: 1,
            started_at: start,
        };
        let card = stats_card(&snapshot, start + Duration::minutes(125));
        assert!(card.contains("Uptime: 2 h 5 min"));
        assert!(card.contains("Total: 3"));
        assert!(card.contains("Success rate: 66.7%"));
    }

    #[test]
    fn stats_empty_rate_is_zero() {
        let start = Utc::now();
        let snapshot = StatsSnapshot {
            total_attempts: 0,
            successes: 0,
            failures: 0,
            started_at: start,
        };
        assert!(stats_card(&snapshot, start).contains("Success rate: 0.0%"));
    }

    #[test]
    fn static_texts() {
        assert!(start_text("@bot").contains("Instagram, YouTube, Facebook, TikTok, Twitter/X"));
        assert!(help_text().contains("50.0 MB"));
        assert_eq!(
            platform_card(Platform::Instagram.info()),
            "📸 Instagram\n\nExample link:\ninstagram.com/..."
        );
    }
}
