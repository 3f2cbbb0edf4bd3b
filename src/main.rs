use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use cache_gateway::config::load_config;
use cache_gateway::lifecycle::{signals, startup};
use cache_gateway::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "cache-gateway", version, about = "Read-through cache service")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "CACHE_GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // A missing .env is normal; a malformed one is worth mentioning.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("warning: failed to load .env: {e}");
        }
    }

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability)?;

    tracing::info!("cache-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        cache_backend = ?config.cache.backend,
        cache_address = %config.cache.address,
        drain_timeout_secs = config.shutdown.drain_timeout_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let gateway = startup::start(config).await?;

    let outcome = gateway
        .run(async {
            let signal = signals::wait_for_termination().await;
            tracing::info!(signal = %signal, "Termination signal received");
        })
        .await;

    // The forced event itself was already logged by the coordinator.
    tracing::info!(outcome = ?outcome, "Shutdown complete");
    Ok(outcome.exit_code())
}
