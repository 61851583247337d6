mod commands;
mod utils;

use clap::{Args, Parser, Subcommand};
use fleetgate_cloud_digitalocean::DEFAULT_API_BASE;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fleetgate")]
#[command(
    about = "Provision a bastion-fronted DigitalOcean fleet with derived firewalls",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate keys, create tags, instances and firewalls
    Up {
        #[command(flatten)]
        api: ApiArgs,
        #[command(flatten)]
        topology: TopologyArgs,
    },
    /// Check that the access token is accepted
    Auth {
        #[command(flatten)]
        api: ApiArgs,
    },
    /// Print the effective topology as YAML
    Config {
        #[command(flatten)]
        topology: TopologyArgs,
    },
    /// Show version information
    Version,
}

#[derive(Args)]
pub struct ApiArgs {
    /// DigitalOcean personal access token
    #[arg(long, env = "DIGITALOCEAN_TOKEN", hide_env_values = true)]
    pub token: String,
    /// API root URL
    #[arg(long, env = "FLEETGATE_API_URL", default_value = DEFAULT_API_BASE)]
    pub api_url: String,
}

#[derive(Args)]
pub struct TopologyArgs {
    /// Topology file (default: discovered fleetgate.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Number of backend instances
    #[arg(long)]
    pub backends: Option<u32>,
    /// Number of bastion instances
    #[arg(long)]
    pub bastions: Option<u32>,
    /// Region slug
    #[arg(long)]
    pub region: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // logs go to stderr; stdout carries the summary only
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Up { api, topology } => commands::up::handle(&api, &topology).await,
        Commands::Auth { api } => commands::auth::handle(&api).await,
        Commands::Config { topology } => commands::config::handle(&topology),
        Commands::Version => {
            println!("fleetgate {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
