//! StreamRate — sponsorship-inventory pricing for live-streamed content.
//!
//! Main entry point that wires the benchmark catalog, the pricing engine,
//! and the calculation/campaign stores into the HTTP server.

use clap::Parser;
use std::sync::Arc;
use streamrate_api::ApiServer;
use streamrate_benchmarks::BenchmarkStore;
use streamrate_campaigns::{CalculationStore, CampaignStore};
use streamrate_core::config::AppConfig;
use streamrate_pricing::{PricingEngine, PricingPolicy};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "streamrate")]
#[command(about = "Sponsorship-inventory pricing for live-streamed content")]
#[command(version)]
struct Cli {
    /// Node identifier (overrides config)
    #[arg(long, env = "STREAMRATE__NODE_ID")]
    node_id: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "STREAMRATE__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Start with an empty benchmark catalog instead of the seeded defaults
    #[arg(long, default_value_t = false)]
    no_seed: bool,

    /// Print a fresh admin token and its SHA-256 digest, then exit
    #[arg(long, default_value_t = false)]
    generate_admin_token: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "streamrate=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    if cli.generate_admin_token {
        let token = streamrate_api::auth::generate_token();
        let digest = streamrate_api::auth::token_digest(&token);
        println!("token:  {}", token);
        println!("digest: {}", digest);
        println!("export STREAMRATE__ADMIN__TOKEN_SHA256={}", digest);
        return Ok(());
    }

    info!("StreamRate starting up");

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        audience_model = %config.pricing.audience_model,
        placement_duration = config.pricing.placement_duration_minutes,
        admin_enabled = config.admin.token_sha256.is_some(),
        "Configuration loaded"
    );

    // Resolve the valuation policy and build the engine
    let policy = PricingPolicy::from_config(&config.pricing)?;
    let engine = Arc::new(PricingEngine::new(policy));

    // Initialize stores
    let benchmarks = Arc::new(if cli.no_seed {
        BenchmarkStore::new()
    } else {
        BenchmarkStore::with_defaults()
    });
    let calculations = Arc::new(CalculationStore::new());
    let campaigns = Arc::new(CampaignStore::new());

    // Start API server
    let api_server = ApiServer::new(config, engine, benchmarks, calculations, campaigns);

    // Start metrics exporter
    if let Err(e) = api_server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("StreamRate is ready to serve traffic");

    // Start HTTP server (blocks until shutdown)
    api_server.start_http().await?;

    Ok(())
}
