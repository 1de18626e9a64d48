use anyhow::Result;
use clap::Parser;
use pfmon::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[derive(Debug, Parser)]
#[command(name = "pfmon", version, about = "pfSense bandwidth monitor")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "CONFIG_FILE", default_value = "config.toml")]
    config: PathBuf,

    /// Keep polling every `general.poll_interval_secs` instead of running a single cycle.
    #[arg(short, long)]
    daemon: bool,
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(s) => s,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load_from_path(&args.config)?;
    tracing::info!(
        version = version::VERSION,
        targets = app_config.targets.len(),
        interfaces = app_config.bandwidth.interfaces.len(),
        daemon = args.daemon,
        "starting"
    );

    let mut worker = worker::Worker::from_config(&app_config, pfsense::PfSenseClient::new());

    if !args.daemon {
        let report = worker.run_cycle().await;
        tracing::info!(
            active_target = report.active_target.as_deref().unwrap_or("-"),
            failed = report.failed_targets().count(),
            "single cycle complete"
        );
        return Ok(());
    }

    worker.run_until(shutdown_signal()).await;

    Ok(())
}
