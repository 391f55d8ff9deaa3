use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::models::settings::AppSettings;

const CONFIG_ENV: &str = "MEDIAGRAB_CONFIG";

/// Defaults, then the JSON file named by `MEDIAGRAB_CONFIG`, then individual
/// environment overrides.
pub fn load_settings() -> anyhow::Result<AppSettings> {
    let base = match std::env::var(CONFIG_ENV) {
        Ok(path) if !path.trim().is_empty() => load_file(Path::new(path.trim()))?,
        _ => AppSettings::default(),
    };
    Ok(apply_env(base, |key| std::env::var(key).ok()))
}

pub fn load_file(path: &Path) -> anyhow::Result<AppSettings> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading settings file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing settings file {}", path.display()))
}

fn apply_env(mut settings: AppSettings, var: impl Fn(&str) -> Option<String>) -> AppSettings {
    let get = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(dir) = get("MEDIAGRAB_OUTPUT_DIR") {
        settings.output_dir = PathBuf::from(dir);
    }
    if let Some(bin) = get("MEDIAGRAB_YTDLP") {
        settings.ytdlp_path = Some(PathBuf::from(bin));
    }
    if let Some(root) = get("MEDIAGRAB_WORKSPACE") {
        settings.workspace_root = Some(PathBuf::from(root));
    }
    if let Some(name) = get("MEDIAGRAB_BOT_USERNAME") {
        settings.bot_username = name;
    }
    match get("MEDIAGRAB_LOG_FILE") {
        Some(v) if v.eq_ignore_ascii_case("off") => settings.log_file = None,
        Some(path) => settings.log_file = Some(PathBuf::from(path)),
        None => {}
    }
    match get("MEDIAGRAB_THUMBNAIL_TIMEOUT").map(|v| v.parse::<u64>()) {
        Some(Ok(secs)) if secs > 0 => settings.thumbnail_timeout_secs = secs,
        Some(_) => tracing::warn!("Ignoring invalid MEDIAGRAB_THUMBNAIL_TIMEOUT"),
        None => {}
    }
    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let s = apply_env(AppSettings::default(), env(&[]));
        assert_eq!(s.thumbnail_timeout_secs, 10);
        assert!(s.auto_install_ytdlp);
        assert!(s.ytdlp_path.is_none());
        assert_eq!(s.bot_username, "@mediagrab");
    }

    #[test]
    fn env_overrides() {
        let s = apply_env(
            AppSettings::default(),
            env(&[
                ("MEDIAGRAB_OUTPUT_DIR", "/srv/out"),
                ("MEDIAGRAB_YTDLP", "/opt/yt-dlp"),
                ("MEDIAGRAB_THUMBNAIL_TIMEOUT", "3"),
                ("MEDIAGRAB_BOT_USERNAME", " @clips_bot "),
            ]),
        );
        assert_eq!(s.output_dir, PathBuf::from("/srv/out"));
        assert_eq!(s.ytdlp_path, Some(PathBuf::from("/opt/yt-dlp")));
        assert_eq!(s.thumbnail_timeout_secs, 3);
        assert_eq!(s.bot_username, "@clips_bot");
    }

    #[test]
    fn invalid_timeout_keeps_default() {
        let s = apply_env(
            AppSettings::default(),
            env(&[("MEDIAGRAB_THUMBNAIL_TIMEOUT", "soon")]),
        );
        assert_eq!(s.thumbnail_timeout_secs, 10);
    }

    #[test]
    fn log_file_defaults_under_data_dir() {
        let s = apply_env(AppSettings::default(), env(&[]));
        if let Some(data) = dirs::data_dir() {
            assert_eq!(s.log_file, Some(data.join("mediagrab/logs/mediagrab.log")));
        }
    }

    #[test]
    fn log_file_env_override() {
        let s = apply_env(
            AppSettings::default(),
            env(&[("MEDIAGRAB_LOG_FILE", "/var/log/mediagrab/bot.log")]),
        );
        assert_eq!(s.log_file, Some(PathBuf::from("/var/log/mediagrab/bot.log")));
    }

    #[test]
    fn log_file_can_be_disabled() {
        let s = apply_env(AppSettings::default(), env(&[("MEDIAGRAB_LOG_FILE", "OFF")]));
        assert!(s.log_file.is_none());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"log_file": null}"#).unwrap();
        assert!(load_file(&path).unwrap().log_file.is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"output_dir": "/data/videos", "auto_install_ytdlp": false}"#)
            .unwrap();

        let s = load_file(&path).unwrap();
        assert_eq!(s.output_dir, PathBuf::from("/data/videos"));
        assert!(!s.auto_install_ytdlp);
        assert_eq!(s.thumbnail_timeout_secs, 10);
    }

    #[test]
    fn broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("parsing settings file"));
    }
}
