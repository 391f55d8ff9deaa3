use std::path::{Path, PathBuf};
use std::time::SystemTime;

fn is_candidate(name: &str) -> bool {
    !(name.ends_with(".part") || name.ends_with(".ytdl") || name.starts_with('.'))
}

fn extension_matches(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

/// Finds the primary media file written into `dir`: the newest file with the
/// reported extension, otherwise the newest file of any extension.
pub async fn locate_artifact(dir: &Path, ext: Option<&str>) -> std::io::Result<Option<PathBuf>> {
    let mut files: Vec<(PathBuf, SystemTime)> = Vec::new();

    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let meta = match entry.metadata().await {
            Ok(m) => m,
            Err(_) => continue,
        };
        if !meta.is_file() {
            continue;
        }

        let path = entry.path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if !is_candidate(name) {
            continue;
        }

        let created = meta
            .created()
            .or_else(|_| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        files.push((path, created));
    }

    let newest = |pred: &dyn Fn(&Path) -> bool| {
        files
            .iter()
            .filter(|(p, _)| pred(p.as_path()))
            .max_by_key(|(_, t)| *t)
            .map(|(p, _)| p.clone())
    };

    let by_ext = ext
        .filter(|e| !e.is_empty())
        .and_then(|e| newest(&|p| extension_matches(p, e)));

    Ok(by_ext.or_else(|| newest(&|_| true)))
}
