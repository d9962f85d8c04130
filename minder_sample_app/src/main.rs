mod backend;
mod demo;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use minder_bridge::BridgeConfig;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bridge against an in-process demo backend and stream a timer
    Demo {
        /// Number of timer ticks to print before stopping
        #[arg(long, default_value_t = 5)]
        ticks: usize,
        /// Milliseconds between two ticks
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
        /// Bridge configuration file (json)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the effective bridge configuration
    Config {
        /// Bridge configuration file (json)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("ERROR: {:#}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<PathBuf>) -> Result<BridgeConfig, anyhow::Error> {
    match path {
        Some(path) => Ok(BridgeConfig::from_path(path)?),
        None => Ok(BridgeConfig::default()),
    }
}

async fn run() -> Result<(), anyhow::Error> {
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo {
            ticks,
            interval_ms,
            config,
        } => {
            if interval_ms == 0 {
                anyhow::bail!("--interval-ms must be positive");
            }
            let config = load_config(config)?;
            demo::run(config, ticks, Duration::from_millis(interval_ms)).await?;
        }
        Commands::Config { config } => {
            let config = load_config(config)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
