//! funcbridged — the funcbridge custom handler.
//!
//! # Usage
//!
//! ```text
//! funcbridged serve --config funcbridge.toml
//! ```
//!
//! The port defaults to `FUNCTIONS_CUSTOMHANDLER_PORT`, which the host sets.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use funcbridge_core::Settings;

const DEFAULT_LOG_FILTER: &str = "info,funcbridge=debug,funcbridged=debug";

#[derive(Parser)]
#[command(name = "funcbridged", about = "funcbridge custom handler")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the functions to the host.
    Serve {
        /// Settings file (TOML).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on; overrides settings and environment.
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config, port } => {
            let mut settings = Settings::load(config.as_deref())?;
            if let Some(port) = port {
                settings.port = port;
            }
            init_tracing(&settings);
            serve(Arc::new(settings)).await
        }
    }
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| match &settings.log_filter {
            Some(directives) => EnvFilter::try_new(directives),
            None => EnvFilter::try_new(DEFAULT_LOG_FILTER),
        })
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn serve(settings: Arc<Settings>) -> anyhow::Result<()> {
    info!(
        http_binding = %settings.http_binding,
        queue_binding = %settings.queue_binding,
        body_dump = settings.body_dump,
        "funcbridged starting"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let router = funcbridged::build_router(settings);

    info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!(error = %err, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("funcbridged stopped");
    Ok(())
}
