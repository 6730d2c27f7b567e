//! `lanwarden-tui` — Terminal dashboard for a lanwarden network-scanning
//! backend.
//!
//! Built on [ratatui](https://ratatui.rs) with reactive data from
//! `lanwarden-core`'s synchronizers. Two screens behind a session gate:
//! Devices (approve / revoke) and Scans (the planned-scan schedule).
//!
//! Logs are written to a file (default `/tmp/lanwarden-tui.log`) to avoid
//! corrupting the terminal UI. A background data bridge task forwards
//! synchronizer state changes into the TUI action loop.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, and app launch.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use lanwarden_api::ApiClient;
use lanwarden_config as config;
use lanwarden_core::{BusySet, DeviceLists, ScheduleBoard, SessionGate};

use crate::app::App;
use crate::data_bridge::Hub;

/// Terminal dashboard for approving devices and managing scan schedules.
#[derive(Parser, Debug)]
#[command(name = "lanwarden-tui", version, about)]
struct Cli {
    /// Backend URL (e.g., https://lanwarden.local:8443)
    #[arg(short = 'b', long, env = "LANWARDEN_BACKEND")]
    backend: Option<String>,

    /// Config profile to use
    #[arg(short = 'p', long, env = "LANWARDEN_PROFILE")]
    profile: Option<String>,

    /// Skip TLS certificate verification
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Log file path (defaults to /tmp/lanwarden-tui.log)
    #[arg(long, default_value = "/tmp/lanwarden-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr — that would
/// corrupt the TUI output. Returns a guard that must be held for the
/// lifetime of the application to ensure logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("lanwarden_tui={log_level},lanwarden_core={log_level}"))
    });

    let log_dir = cli.log_file.parent().unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("lanwarden-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Build the API client from CLI flags and the shared config file.
/// Flags win over the profile; a bare `--backend` needs no config at all.
fn build_api(cli: &Cli) -> Result<Arc<ApiClient>> {
    let cfg = config::load_config_or_default();

    let (url, mut transport) = match cfg.profile(cli.profile.as_deref()) {
        Ok((_, profile)) => {
            let url = match cli.backend.as_deref() {
                Some(raw) => raw.parse()?,
                None => config::backend_url(profile)?,
            };
            (url, config::profile_transport(profile, &cfg.defaults))
        }
        Err(_) => {
            let raw = cli.backend.as_deref().ok_or_else(|| {
                eyre!(
                    "no backend configured: pass --backend or create {}",
                    config::config_path().display()
                )
            })?;
            (
                raw.parse()?,
                lanwarden_api::TransportConfig {
                    tls: lanwarden_api::TlsMode::System,
                    timeout: std::time::Duration::from_secs(30),
                    cookie_jar: None,
                },
            )
        }
    };

    if cli.insecure {
        transport.tls = lanwarden_api::TlsMode::DangerAcceptInvalid;
    }

    Ok(Arc::new(ApiClient::new(url, &transport)?))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // Tracing to file — hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    let api = build_api(&cli)?;
    info!(backend = %api.base_url(), "starting lanwarden-tui");

    let busy = Arc::new(BusySet::new());
    let hub = Hub {
        gate: Arc::new(SessionGate::new(Arc::clone(&api))),
        lists: Arc::new(DeviceLists::new(Arc::clone(&api), Arc::clone(&busy))),
        board: Arc::new(ScheduleBoard::new(api, Arc::clone(&busy))),
        busy,
    };

    let mut app = App::new(hub.clone());

    // Wire the synchronizers' watch channels into the action loop
    let bridge_cancel = CancellationToken::new();
    let bridge = tokio::spawn(data_bridge::spawn_data_bridge(
        hub,
        app.action_tx(),
        bridge_cancel.clone(),
    ));

    let result = app.run().await;

    bridge_cancel.cancel();
    let _ = bridge.await;

    result
}
