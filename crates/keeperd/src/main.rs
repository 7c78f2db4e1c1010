//! keeperd — the cfkeeper daemon.
//!
//! Keeps Cloud Foundry apps reachable: a webhook triggers a
//! check-restart-verify run for one app, and status surfaces report the
//! whole fleet.
//!
//! # Usage
//!
//! ```text
//! keeperd serve --config keeper.toml --port 8787
//! keeperd restart --config keeper.toml --app-url https://shop.cfapps.ap21.hana.ondemand.com
//! keeperd status --config keeper.toml
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use keeper_core::Settings;
use keeper_orchestrator::KeeperContext;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,keeperd=debug,keeper=debug";

#[derive(Parser)]
#[command(name = "keeperd", about = "Cloud Foundry app keepalive daemon")]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the webhook, status JSON and status page.
    Serve {
        /// Path to keeper.toml.
        #[arg(long, default_value = "keeper.toml")]
        config: PathBuf,

        /// Port to listen on; overrides `[server] port`.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run one restart orchestration in the foreground.
    Restart {
        #[arg(long, default_value = "keeper.toml")]
        config: PathBuf,

        /// Public URL of a configured app.
        #[arg(long)]
        app_url: String,
    },
    /// Print a status snapshot of every configured app.
    Status {
        #[arg(long, default_value = "keeper.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match cli.command {
        Command::Serve { config, port } => run_serve(&config, port).await,
        Command::Restart { config, app_url } => run_restart(&config, &app_url).await,
        Command::Status { config } => run_status(&config).await,
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load(config: &Path) -> anyhow::Result<Settings> {
    Settings::load(config).with_context(|| format!("loading {}", config.display()))
}

async fn run_serve(config: &Path, port: Option<u16>) -> anyhow::Result<()> {
    let settings = load(config)?;
    let port = port.unwrap_or(settings.port);
    let ctx = KeeperContext::from_settings(settings)?;

    let router = keeper_api::build_router(ctx);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!(%addr, "keeperd listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "cannot listen for ctrl-c, running until killed");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("keeperd stopped");
    Ok(())
}

async fn run_restart(config: &Path, app_url: &str) -> anyhow::Result<()> {
    let ctx = KeeperContext::from_settings(load(config)?)?;
    let app = ctx
        .find_app(app_url)
        .cloned()
        .with_context(|| format!("no configured app with url {app_url}"))?;

    let result = ctx
        .orchestrator()
        .ensure_running(&app, "cli")
        .await
        .with_context(|| format!("restart of {} failed", app.name))?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn run_status(config: &Path) -> anyhow::Result<()> {
    let ctx = KeeperContext::from_settings(load(config)?)?;
    let snapshots = ctx.fleet_monitor().snapshot("cli-status").await;
    println!("{}", serde_json::to_string_pretty(&snapshots)?);
    Ok(())
}
