use clap::{Parser, Subcommand};
use serde::Serialize;

use cache_gateway_sdk::{ClientError, GatewayClient};

#[derive(Parser)]
#[command(name = "cache-cli")]
#[command(about = "Command-line client for the cache gateway", long_about = None)]
struct Cli {
    #[arg(short, long, env = "CACHE_GATEWAY_URL", default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway liveness
    Health,
    /// Read a cached value
    Get {
        /// Cache key
        key: String,
    },
    /// Submit input for processing
    Process {
        /// Input string
        input: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = GatewayClient::new(&cli.url)?;

    let result = match cli.command {
        Commands::Health => print_json(client.health().await),
        Commands::Get { key } => print_json(client.get_cached_data(&key).await),
        Commands::Process { input } => print_json(client.process_data(&input).await),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn print_json<T: Serialize>(result: Result<T, ClientError>) -> Result<(), Box<dyn std::error::Error>> {
    let value = result?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
