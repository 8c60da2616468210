//! `bustrack-tui`: terminal front end for the bus tracking demo.
//!
//! Three screens, switched with number keys: the Dashboard (fleet table
//! with search, route filter and schedules), Live Tracking (simulated
//! position of one bus) and the Admin Panel (edit status, add routes).
//!
//! Logs go to a file (default `/tmp/bustrack-tui.log`) so they never
//! corrupt the terminal. A background data bridge streams fleet updates
//! from the controller into the action loop.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod keymap;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use bustrack_core::Controller;

use crate::app::App;

/// Terminal dashboard for tracking and managing the bus fleet.
#[derive(Parser, Debug)]
#[command(name = "bustrack-tui", version, about)]
struct Cli {
    /// Server base URL (e.g., http://localhost:5000/api)
    #[arg(short = 'u', long, env = "BUSTRACK_API_URL")]
    api_url: Option<String>,

    /// Log file path
    #[arg(long, default_value = "/tmp/bustrack-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing; stdout belongs to the terminal UI. Hold the guard
/// for the lifetime of the app so logs flush.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "bustrack_tui={log_level},bustrack_core={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("bustrack-tui.log"));

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

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks go in before the terminal switches to raw mode
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    // Config file and BUSTRACK_* env, then the command line
    let mut cfg = bustrack_config::load_config()?;
    if let Some(url) = cli.api_url {
        cfg.client.api_url = url;
    }
    let controller = Controller::new(cfg.client.client_config()?)?;
    let params = cfg.simulation.params()?;

    info!(api_url = %cfg.client.api_url, "starting bustrack-tui");

    let mut app = App::new(controller, params);
    app.run().await?;

    Ok(())
}
