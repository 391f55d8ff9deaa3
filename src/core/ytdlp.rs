use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{anyhow, Context};
use mediagrab_core::core::format::format_size;
use mediagrab_core::models::download::{DownloadStatus, ProgressSnapshot};
use mediagrab_core::models::media::MediaMetadata;
use mediagrab_core::platforms::strategy::RetrievalRequest;
use mediagrab_core::platforms::traits::{Extractor, ProgressCallback};
use regex::Regex;

use crate::core::{http_client, process};

const PROGRESS_MARKER: &str = "mgprogress";

static ERROR_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ERROR:\s*(?:\[[^\]]+\]\s*)?(.+)$").unwrap());

const YTDLP: &str = "yt-dlp";
const INSTALL_TIMEOUT: Duration = Duration::from_secs(120);

fn release_asset_url() -> String {
    let asset = if cfg!(target_os = "windows") {
        "yt-dlp.exe"
    } else if cfg!(target_os = "macos") {
        "yt-dlp_macos"
    } else {
        "yt-dlp"
    };
    format!("https://github.com/yt-dlp/yt-dlp/releases/latest/download/{}", asset)
}

/// Prefers a `yt-dlp` that answers `--version` on `PATH`, then a copy
/// previously installed into the managed bin dir.
pub async fn find_ytdlp() -> Option<PathBuf> {
    let on_path = process::command(YTDLP)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .is_ok_and(|status| status.success());
    if on_path {
        return Some(PathBuf::from(YTDLP));
    }

    process::managed_tool_path(YTDLP).filter(|p| p.is_file())
}

pub async fn ensure_ytdlp() -> anyhow::Result<PathBuf> {
    if let Some(path) = find_ytdlp().await {
        return Ok(path);
    }

    let target = process::managed_tool_path(YTDLP)
        .ok_or_else(|| anyhow!("no data directory to install yt-dlp into"))?;
    install_ytdlp(&release_asset_url(), &target)
        .await
        .with_context(|| format!("installing yt-dlp to {}", target.display()))?;
    Ok(target)
}

/// Fetches the release binary into `target`. The download lands in a `.part`
/// file first so an interrupted install never leaves a truncated executable
/// where `find_ytdlp` would pick it up.
async fn install_ytdlp(url: &str, target: &Path) -> anyhow::Result<()> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    tracing::info!("Downloading yt-dlp from {}", url);
    let bytes = http_client::build_client(INSTALL_TIMEOUT)?
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .with_context(|| format!("requesting {}", url))?
        .bytes()
        .await
        .context("reading release body")?;
    if bytes.is_empty() {
        return Err(anyhow!("empty release download from {}", url));
    }

    let partial = target.with_extension("part");
    tokio::fs::write(&partial, &bytes).await?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(&partial, std::fs::Permissions::from_mode(0o755)).await?;
    }
    tokio::fs::rename(&partial, target).await?;

    tracing::info!("Installed yt-dlp ({}) at {}", format_size(bytes.len() as u64), target.display());
    Ok(())
}

/// Extraction backed by the `yt-dlp` executable, run as a blocking child
/// process on the calling thread.
pub struct YtDlpExtractor {
    binary: PathBuf,
}

impl YtDlpExtractor {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Extractor for YtDlpExtractor {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    fn extract(
        &self,
        request: &RetrievalRequest,
        progress: ProgressCallback<'_>,
    ) -> anyhow::Result<MediaMetadata> {
        std::fs::create_dir_all(&request.destination_dir)?;

        let mut child = process::std_command(&self.binary)
            .args(build_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to start {}", self.binary.display()))?;

        let stdout = child.stdout.take().ok_or_else(|| anyhow!("no stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| anyhow!("no stderr"))?;

        let (metadata, last_error) = std::thread::scope(|s| {
            let errors = s.spawn(move || {
                let mut last_error = None;
                for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                    if let Some(snapshot) = parse_progress_line(&line) {
                        progress(snapshot);
                    } else if let Some(msg) = parse_error_line(&line) {
                        last_error = Some(msg);
                    }
                }
                last_error
            });

            let mut metadata = None;
            for line in BufReader::new(stdout).lines().map_while(Result::ok) {
                if let Some(snapshot) = parse_progress_line(&line) {
                    progress(snapshot);
                } else if line.starts_with('{') {
                    match parse_metadata(&line) {
                        Ok(m) => metadata = Some(m),
                        Err(e) => tracing::debug!("Skipping unparsable yt-dlp output: {}", e),
                    }
                }
            }

            (metadata, errors.join().unwrap_or(None))
        });

        let status = child.wait().context("yt-dlp process failed")?;
        if !status.success() {
            return Err(match last_error {
                Some(msg) => anyhow!(msg),
                None => anyhow!("yt-dlp exited with {}", status),
            });
        }

        metadata.ok_or_else(|| anyhow!("no video information received"))
    }
}

fn build_args(request: &RetrievalRequest) -> Vec<String> {
    let mut args = vec!["-f".to_string(), request.format_selector.clone()];

    if request.no_playlist {
        args.push("--no-playlist".to_string());
    }

    args.extend([
        "--dump-json".to_string(),
        "--no-simulate".to_string(),
        "--no-warnings".to_string(),
        "--newline".to_string(),
        "--progress".to_string(),
        "--progress-template".to_string(),
        format!(
            "download:{}|%(progress.status)s|%(progress.downloaded_bytes)s|%(progress.total_bytes)s|%(progress.total_bytes_estimate)s|%(progress.speed)s",
            PROGRESS_MARKER
        ),
        "--socket-timeout".to_string(),
        request.socket_timeout.as_secs().to_string(),
        "--retries".to_string(),
        request.retries.to_string(),
        "--fragment-retries".to_string(),
        request.fragment_retries.to_string(),
    ]);

    for (name, value) in &request.headers {
        args.push("--add-header".to_string());
        args.push(format!("{}:{}", name, value));
    }

    if request.geo_bypass() {
        args.push("--geo-bypass".to_string());
    }

    if let Some(mode) = request.preferred_login() {
        args.push("--extractor-args".to_string());
        args.push(format!("{}:preferred_login={}", request.platform, mode));
    }

    args.push("-o".to_string());
    args.push(request.output_template.to_string_lossy().to_string());
    args.push(request.url.clone());
    args
}

fn parse_number(field: &str) -> Option<u64> {
    let v = field.trim().parse::<f64>().ok()?;
    if v.is_finite() && v >= 0.0 {
        Some(v as u64)
    } else {
        None
    }
}

fn parse_progress_line(line: &str) -> Option<ProgressSnapshot> {
    let rest = line.trim().strip_prefix(PROGRESS_MARKER)?.strip_prefix('|')?;
    let fields: Vec<&str> = rest.split('|').collect();
    if fields.len() < 5 {
        return None;
    }

    let status = match fields[0].trim() {
        "downloading" => DownloadStatus::Downloading,
        "finished" => DownloadStatus::Complete,
        _ => DownloadStatus::Pending,
    };
    let total = parse_number(fields[2])
        .filter(|t| *t > 0)
        .or_else(|| parse_number(fields[3]))
        .unwrap_or(0);

    Some(ProgressSnapshot {
        status,
        downloaded_bytes: parse_number(fields[1]).unwrap_or(0),
        total_bytes: total,
        speed_bps: parse_number(fields[4]).unwrap_or(0),
    })
}

fn parse_error_line(line: &str) -> Option<String> {
    ERROR_LINE_RE
        .captures(line.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

fn parse_metadata(line: &str) -> anyhow::Result<MediaMetadata> {
    let json: serde_json::Value = serde_json::from_str(line)?;

    let entry = json
        .get("entries")
        .and_then(|v| v.as_array())
        .and_then(|entries| entries.first())
        .unwrap_or(&json);

    let str_field = |key: &str| {
        entry
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    };

    Ok(MediaMetadata {
        title: str_field("title"),
        duration_seconds: entry.get("duration").and_then(|v| v.as_f64()),
        thumbnail_url: str_field("thumbnail"),
        uploader: str_field("uploader").or_else(|| str_field("uploader_id")),
        view_count: entry.get("view_count").and_then(|v| v.as_u64()),
        ext: str_field("ext"),
    })
}
