//! Sanctuary Serve - static host for the browser build
//!
//! Serves the WASM bundle and the scene assets it fetches at runtime.

mod config;
mod server;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "sanctuary-serve")]
#[command(about = "Serve the Sanctuary scene and its assets")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "sanctuary.toml")]
    config: PathBuf,

    /// Bind address for web server
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Sanctuary Serve v{}", env!("CARGO_PKG_VERSION"));

    let mut config = config::load_config(&args.config)?;

    // Override bind address if specified
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    info!(
        web = %config.paths.web.display(),
        assets = %config.paths.assets.display(),
        "Configuration loaded"
    );

    server::run(&config).await
}
