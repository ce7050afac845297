use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use news_router::{build_pipeline, Config};

#[derive(Parser, Debug)]
#[command(
    name = "news-router",
    about = "Routes news feed items to notification sinks",
    version
)]
struct Args {
    /// Path to the TOML configuration file.
    config: PathBuf,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!("Starting news-router with config {}", args.config.display());
    let text = std::fs::read_to_string(&args.config)
        .with_context(|| format!("reading config {}", args.config.display()))?;
    let config = Config::from_toml(&text).context("parsing config")?;

    let (mut pipeline, errors) = build_pipeline(&config);
    if !errors.is_empty() {
        for e in &errors {
            error!("Config error: {e}");
        }
        process::exit(1);
    }

    pipeline.start().context("starting pipeline")?;

    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
    info!("Shutdown requested");
    pipeline.stop();
    pipeline.wait().await;
    Ok(())
}
