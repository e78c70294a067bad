//! turbo-log
//!
//! Loads a service configuration, initializes logging the way a turbo
//! service does at startup, and emits a few entries.
//!
//! ```text
//! turbo-log --config service.toml --env production --message "hello"
//! ```

use std::path::PathBuf;

use clap::Parser;

use turbo_log::config::load_config;
use turbo_log::lifecycle::init_logging_or_exit;

#[derive(Parser)]
#[command(name = "turbo-log")]
#[command(about = "Initialize turbo service logging and emit test entries", long_about = None)]
struct Cli {
    /// Service configuration file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured environment.
    #[arg(short, long)]
    env: Option<String>,

    /// Message to log after startup.
    #[arg(short, long)]
    message: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Default::default(),
    };
    if let Some(env) = cli.env {
        config.env = env;
    }

    let logger = init_logging_or_exit(&config);

    tracing::info!(
        service_root = %config.service_root,
        production = config.is_production(),
        "turbo-log v0.1.0 started"
    );
    tracing::debug!(hooks = ?logger.hook_names(), "Logger ready");

    if let Some(message) = cli.message {
        tracing::info!("{}", message);
    }

    Ok(())
}
