use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mediagrab_core::{Extractor, Orchestrator, Stats};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::commands::Command;
use crate::core::delivery::{DeliveryChannel, DirectoryDelivery};
use crate::core::events::{send, Outbox, Reply};
use crate::core::messages;
use crate::core::ytdlp::{self, YtDlpExtractor};
use crate::models::settings::AppSettings;

pub mod commands;
pub mod core;
pub mod models;
pub mod storage;

pub struct AppState {
    pub settings: AppSettings,
    pub orchestrator: Orchestrator,
    pub delivery: Arc<dyn DeliveryChannel>,
    pub http: reqwest::Client,
    pub outbox: Outbox,
    next_job: AtomicU64,
}

impl AppState {
    pub fn new(
        settings: AppSettings,
        extractor: Arc<dyn Extractor>,
        delivery: Arc<dyn DeliveryChannel>,
        outbox: Outbox,
    ) -> anyhow::Result<Self> {
        let mut orchestrator = Orchestrator::new(extractor, Arc::new(Stats::new()));
        if let Some(root) = &settings.workspace_root {
            orchestrator = orchestrator.with_workspace_root(root.clone());
        }
        let http = core::http_client::build_client(Duration::from_secs(
            settings.thumbnail_timeout_secs,
        ))?;

        Ok(Self {
            settings,
            orchestrator,
            delivery,
            http,
            outbox,
            next_job: AtomicU64::new(1),
        })
    }

    pub fn next_job_id(&self) -> u64 {
        self.next_job.fetch_add(1, Ordering::Relaxed)
    }
}

/// Command-line overrides layered on top of the loaded settings.
#[derive(Debug, Default, Clone)]
pub struct RunOptions {
    pub urls: Vec<String>,
    pub output_dir: Option<PathBuf>,
    pub ytdlp: Option<PathBuf>,
    pub no_install: bool,
}

async fn resolve_extractor(settings: &AppSettings, opts: &RunOptions) -> anyhow::Result<PathBuf> {
    if let Some(path) = opts.ytdlp.clone().or_else(|| settings.ytdlp_path.clone()) {
        return Ok(path);
    }
    if settings.auto_install_ytdlp && !opts.no_install {
        return ytdlp::ensure_ytdlp().await;
    }
    ytdlp::find_ytdlp()
        .await
        .ok_or_else(|| anyhow::anyhow!("yt-dlp not found; install it or set MEDIAGRAB_YTDLP"))
}

pub async fn run(mut settings: AppSettings, opts: RunOptions) -> anyhow::Result<()> {
    if let Some(dir) = &opts.output_dir {
        settings.output_dir = dir.clone();
    }

    let binary = resolve_extractor(&settings, &opts).await?;
    info!("Using extractor at {}", binary.display());

    let (tx, rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(print_replies(rx));

    let delivery = Arc::new(DirectoryDelivery::new(settings.output_dir.clone()));
    let state = Arc::new(AppState::new(
        settings,
        Arc::new(YtDlpExtractor::new(binary)),
        delivery,
        tx,
    )?);

    let mut jobs = JoinSet::new();

    if opts.urls.is_empty() {
        send(&state.outbox, None, commands::info::start(&state));
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                line = lines.next_line() => match line? {
                    Some(line) => dispatch(&state, &mut jobs, &line),
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    return Ok(());
                }
            }
        }
    } else {
        for url in &opts.urls {
            dispatch(&state, &mut jobs, url);
        }
    }

    while jobs.join_next().await.is_some() {}

    drop(state);
    let _ = printer.await;
    Ok(())
}

fn dispatch(state: &Arc<AppState>, jobs: &mut JoinSet<()>, input: &str) {
    let Some(command) = commands::parse(input) else {
        return;
    };

    let reply = match command {
        Command::Start => commands::info::start(state),
        Command::Help | Command::Unknown(_) => commands::info::help(),
        Command::Stats => commands::info::stats(state),
        Command::PlatformInfo(platform) => commands::info::platform(platform),
        Command::Link(url) => {
            spawn_link(state.clone(), jobs, url);
            return;
        }
    };
    send(&state.outbox, None, reply);
}

/// Each link runs on its own task; a panic inside it is logged and answered
/// with a generic apology instead of taking the session down.
fn spawn_link(state: Arc<AppState>, jobs: &mut JoinSet<()>, url: String) {
    let job = state.next_job_id();
    jobs.spawn(async move {
        let inner = {
            let state = state.clone();
            tokio::spawn(async move { commands::downloads::handle_link(&state, job, &url).await })
        };
        match inner.await {
            Ok(outcome) => info!("Job {} finished: {:?}", job, outcome),
            Err(e) if e.is_cancelled() => warn!("Job {} cancelled", job),
            Err(e) => {
                error!("Job {} crashed: {}", job, e);
                send(&state.outbox, Some(job), messages::UNEXPECTED_ERROR);
            }
        }
    });
}

async fn print_replies(mut rx: mpsc::UnboundedReceiver<Reply>) {
    while let Some(reply) = rx.recv().await {
        match reply.job {
            Some(job) => println!("[#{}] {}\n", job, reply.text.replace('\n', "\n     ")),
            None => println!("{}\n", reply.text),
        }
    }
}
