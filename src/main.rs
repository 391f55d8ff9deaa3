use std::path::PathBuf;

use clap::Parser;
use mediagrab_lib::core::logging::init_tracing;
use mediagrab_lib::storage::config::load_settings;
use mediagrab_lib::RunOptions;

#[derive(Parser)]
#[command(name = "mediagrab")]
#[command(about = "Fetch videos from Instagram, YouTube, Facebook, TikTok and Twitter/X links")]
struct Cli {
    /// Links to fetch; reads commands and links from stdin when empty
    urls: Vec<String>,

    /// Directory delivered files are written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Path to the yt-dlp executable
    #[arg(long)]
    ytdlp: Option<PathBuf>,

    /// Never download a managed yt-dlp copy
    #[arg(long)]
    no_install: bool,
}

fn setup_environment() {
    std::env::remove_var("PYTHONHOME");
    std::env::remove_var("PYTHONPATH");
}

fn main() -> anyhow::Result<()> {
    setup_environment();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = load_settings()?;
    let _log_guard = init_tracing(settings.log_file.as_deref())?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(mediagrab_lib::run(settings, RunOptions {
        urls: cli.urls,
        output_dir: cli.output_dir,
        ytdlp: cli.ytdlp,
        no_install: cli.no_install,
    }))
}
