use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use kubegraph_k8s::KubeClient;

mod config;
mod server;

use config::{Config, DEFAULT_CONFIG_PATH};
use server::AppState;

/// Kubegraph - An HTTP view over Kubernetes workloads and the graph that connects them
#[derive(Parser, Debug)]
#[command(name = "kubegraph")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(long, short, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Address to bind (overrides the config file)
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on (overrides the config file)
    #[arg(long, short)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)?.with_overrides(args.bind, args.port);

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.level))
        .context("Invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = run(config).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run(config: Config) -> Result<()> {
    let client = KubeClient::connect(config.cluster.timeouts())
        .await
        .context("Failed to initialize Kubernetes client")?;

    let state = AppState::new(Arc::new(client), config.logs.since_seconds);
    let app = server::router(state, &config.server.prefix);

    server::serve(app, &config.server.address()).await
}
