//! API server — router assembly and HTTP/metrics startup.

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use streamrate_benchmarks::BenchmarkStore;
use streamrate_campaigns::{CalculationStore, CampaignStore};
use streamrate_core::config::AppConfig;
use streamrate_pricing::PricingEngine;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth;
use crate::rest::{self, AppState};

/// Main API server for the pricing service.
pub struct ApiServer {
    config: AppConfig,
    state: AppState,
}

impl ApiServer {
    pub fn new(
        config: AppConfig,
        engine: Arc<PricingEngine>,
        benchmarks: Arc<BenchmarkStore>,
        calculations: Arc<CalculationStore>,
        campaigns: Arc<CampaignStore>,
    ) -> Self {
        let state = AppState {
            engine,
            benchmarks,
            calculations,
            campaigns,
            admin_token_digest: config.admin.token_sha256.clone(),
            node_id: config.node_id.clone(),
            start_time: Instant::now(),
        };
        Self { config, state }
    }

    /// Build the application router.
    pub fn router(&self) -> Router {
        Router::new()
            // Calculator
            .route("/api/v1/calculator/calculate", post(rest::calculate))
            .route("/api/v1/calculator/multi-brand", post(rest::multi_brand))
            .route("/api/v1/calculator/history", get(rest::history))
            .route(
                "/api/v1/calculator/calculations/:id",
                get(rest::get_calculation),
            )
            // Benchmarks
            .route("/api/v1/benchmarks/industries", get(rest::list_industries))
            .route("/api/v1/benchmarks/industries/:id", get(rest::get_industry))
            .route(
                "/api/v1/benchmarks/industries/slug/:slug",
                get(rest::get_industry_by_slug),
            )
            .route("/api/v1/benchmarks/multipliers", get(rest::list_multipliers))
            .route("/api/v1/benchmarks/summary", get(rest::benchmarks_summary))
            // Campaigns
            .route(
                "/api/v1/campaigns",
                get(rest::list_campaigns).post(rest::create_campaign),
            )
            .route(
                "/api/v1/campaigns/:id",
                get(rest::get_campaign).delete(rest::delete_campaign),
            )
            // Admin (bearer-token guarded by middleware)
            .route("/api/v1/admin/industries", post(auth::upsert_industry))
            .route(
                "/api/v1/admin/industries/:slug",
                delete(auth::remove_industry),
            )
            // Operational
            .route("/health", get(rest::health_check))
            .route("/ready", get(rest::readiness))
            .route("/live", get(rest::liveness))
            // Middleware
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth::admin_auth,
            ))
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the HTTP server (blocks until shutdown).
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = self.router();
        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the Prometheus metrics exporter on its own port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
        let handle = builder
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install_recorder()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");

        // Keep the handle alive
        std::mem::forget(handle);
        Ok(())
    }
}
