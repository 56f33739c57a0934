use clap::Parser;
use nearjobs::{Config, StoreBuilder};
use nearjobs_server::run_server;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 4042)]
    port: u16,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// CSV file of `title,longitude,latitude` records
    #[arg(short, long)]
    db: PathBuf,

    /// JSON file overriding index and store settings
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nearjobs_server=info,nearjobs=info,info".into()),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            info!("Reading configuration from {}", path.display());
            Config::from_json(&std::fs::read_to_string(path)?)?
        }
        None => Config::default(),
    };

    info!("Loading jobs from {}", args.db.display());
    let store = StoreBuilder::new()
        .csv_path(&args.db)
        .config(config)
        .build()?;
    let stats = store.stats();
    info!(
        "Indexed {} jobs (height {}, {} nodes)",
        stats.entry_count, stats.height, stats.node_count
    );

    let listener = tokio::net::TcpListener::bind((args.host.as_str(), args.port)).await?;
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl_c signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received, stopping server...");
    };

    run_server(listener, Arc::new(store), shutdown).await?;

    Ok(())
}
