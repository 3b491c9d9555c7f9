pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod services;

use clap::Parser;
use cli::Cli;
use config::AppConfig;
use error::AppError;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("waste_sorter_lib=info,tower_http=info"));
    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::from_env();
    cli.apply_to(&mut config);

    init_tracing();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::Configuration(format!("Failed to start async runtime: {}", e)))?;

    runtime.block_on(cli::dispatch(cli, config))
}
