use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// Keeps child consoles from flashing up on Windows.
#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x08000000;

/// Location of a helper executable that mediagrab installs itself, e.g.
/// `~/.local/share/mediagrab/bin/yt-dlp`.
pub fn managed_tool_path(tool: &str) -> Option<PathBuf> {
    tool_dir().map(|dir| dir.join(format!("{}{}", tool, std::env::consts::EXE_SUFFIX)))
}

fn tool_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("mediagrab").join("bin"))
}

/// Environment every helper process runs with: the managed bin dir ahead of
/// the inherited `PATH`, and UTF-8 output from Python-based tools.
fn child_env() -> Vec<(&'static str, OsString)> {
    let mut env = vec![
        ("PYTHONIOENCODING", OsString::from("utf-8")),
        ("PYTHONUTF8", OsString::from("1")),
    ];

    if let Some(dir) = tool_dir() {
        let inherited = std::env::var_os("PATH").unwrap_or_default();
        let dirs = std::iter::once(dir).chain(std::env::split_paths(&inherited));
        match std::env::join_paths(dirs) {
            Ok(path) => env.push(("PATH", path)),
            Err(e) => tracing::debug!("Keeping inherited PATH: {}", e),
        }
    }
    env
}

pub fn command(program: impl AsRef<OsStr>) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(program);
    #[cfg(target_os = "windows")]
    cmd.creation_flags(CREATE_NO_WINDOW);
    cmd.envs(child_env());
    cmd
}

/// Blocking variant, for extraction running on a `spawn_blocking` thread.
pub fn std_command(program: impl AsRef<OsStr>) -> std::process::Command {
    let mut cmd = std::process::Command::new(program);
    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }
    cmd.envs(child_env());
    cmd
}
