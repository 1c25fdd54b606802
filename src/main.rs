use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use duo_tracker::api::coordinator::UpdateCoordinator;
use duo_tracker::api::state::AppState;
use duo_tracker::composition::TraitCatalog;
use duo_tracker::config::AppConfig;
use duo_tracker::fetch::Fetcher;
use duo_tracker::storage::SnapshotCache;
use duo_tracker::{RiotId, StatsTracker};

#[derive(Parser)]
#[command(name = "duo-tracker")]
#[command(about = "Double Up partner stats for two TFT players")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run one update and print the snapshot as JSON
    Lookup {
        /// First player as NAME#TAG
        #[arg(long)]
        player1: RiotId,

        /// Second player as NAME#TAG
        #[arg(long)]
        player2: RiotId,

        /// Server code (NA, EUW, KR, ...)
        #[arg(long, default_value = "NA")]
        server: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting duo-tracker v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    let tracker = build_tracker(&config)?;

    match cli.command {
        Commands::Serve { host, port } => {
            let state = AppState {
                tracker: Arc::new(tracker),
                cache: Arc::new(SnapshotCache::new(config.cache.path.clone())),
                coordinator: Arc::new(UpdateCoordinator::new(config.server.cooldown()?)),
                update_deadline: config.server.update_deadline()?,
            };
            let app = duo_tracker::api::build_router(state);
            let addr = format!(
                "{}:{}",
                host.unwrap_or(config.server.host),
                port.unwrap_or(config.server.port)
            );
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Lookup {
            player1,
            player2,
            server,
        } => {
            let snapshot = tracker
                .correlate_and_aggregate(&player1, &player2, &server)
                .await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
    }

    Ok(())
}

fn build_tracker(config: &AppConfig) -> Result<StatsTracker> {
    let api_key = config.api.api_key()?;
    let fetcher = Fetcher::with_api_key(&api_key, &config.api.fetcher_config())
        .context("Failed to create HTTP client")?;
    Ok(StatsTracker::new(
        fetcher,
        TraitCatalog::set_13(),
        config.api.season_rules(),
    ))
}
