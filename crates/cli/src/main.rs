//! cloudsweep CLI
//!
//! Discovers resources of the registered kinds and removes the ones the
//! operator names explicitly.

mod commands;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use cloudsweep_aws::elbv2::{self, CancellableElbv2, Elbv2Api, SdkElbv2Client};
use cloudsweep_core::ResourceKindRegistry;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::SweepConfig;

/// cloudsweep: discover and remove cloud resources.
#[derive(Parser, Debug)]
#[command(name = "cloudsweep", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "cloudsweep.toml", global = true)]
    config: PathBuf,

    /// AWS region, overriding the configuration file.
    #[arg(long, env = "AWS_REGION", global = true)]
    region: Option<String>,

    /// Output format.
    #[arg(long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the registered resource kinds.
    Kinds,
    /// Discover resources and print their properties.
    Scan(commands::scan::ScanArgs),
    /// Remove discovered resources by ARN.
    Remove(commands::remove::RemoveArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = SweepConfig::load(&cli.config)?.with_region(cli.region.clone());

    let token = CancellationToken::new();
    let on_interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling in-flight calls");
            on_interrupt.cancel();
        }
    });

    let client: Arc<dyn Elbv2Api> = Arc::new(CancellableElbv2::new(
        Arc::new(SdkElbv2Client::new(&config.elbv2).await),
        token,
    ));
    let registry = elbv2::register(ResourceKindRegistry::builder(), client, &config.elbv2)?.build();

    match cli.command {
        Command::Kinds => commands::kinds::run(&registry, &cli.format),
        Command::Scan(args) => commands::scan::run(&registry, &args, &cli.format).await,
        Command::Remove(args) => commands::remove::run(&registry, &args, &cli.format).await,
    }
}
