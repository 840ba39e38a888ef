/*
newsboard - main.rs
Refreshes the news block and update time of a static page from the BBC News RSS feed.
Meant to be run by an external scheduler; always exits 0 once logging is up.
*/

use clap::Parser;
use common::Config;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use newsboard::ingestion::FEED_URL;
use newsboard::refresh;

#[derive(Parser, Debug)]
#[command(name = "newsboard", about = "Refresh the news block of a static page")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse CLI args
    let args = Args::parse();

    // Resolve config paths
    let default_path = PathBuf::from("config.default.toml");
    let override_path = args.config.clone().unwrap_or_else(|| PathBuf::from("config.toml"));

    // Configuration is loaded before logging so its level can apply; errors are reported once
    // the subscriber exists.
    let loaded = Config::load_with_defaults(Some(&default_path), Some(&override_path)).await;
    let level = args
        .log_level
        .clone()
        .or_else(|| loaded.as_ref().ok().map(|cfg| cfg.logging.level.clone()))
        .unwrap_or_else(|| "info".to_string());

    // Initialize logging
    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = match loaded {
        Ok(cfg) => {
            info!(defaults = ?default_path, overrides = ?override_path, "configuration loaded");
            cfg
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "failed to load configuration, using built-in defaults");
            Config::default()
        }
    };
    if args.config.is_some() && !override_path.exists() {
        error!(path = ?override_path, "specified config file not found, ignoring it");
    }

    info!("news refresh starting");
    let report = refresh::run(&config, FEED_URL).await;
    info!(
        items = report.items_fetched,
        page_written = report.page.is_some(),
        "news refresh finished"
    );
}
