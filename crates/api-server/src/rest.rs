//! REST API handlers: calculator, benchmarks, and campaign endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use streamrate_benchmarks::{BenchmarkStore, BenchmarkSummary, Industry, PremiumMultiplier};
use streamrate_campaigns::{
    AdSlot, CalculationStore, CampaignDetail, CampaignStore, CampaignSummary, HistoryEntry,
    StoredCalculation,
};
use streamrate_core::PricingError;
use streamrate_pricing::{
    BrandPlacementRequest, CalculationInput, MultiBrandResult, PricingEngine,
};
use tracing::warn;
use uuid::Uuid;

/// Default and maximum sizes for the history listing.
const DEFAULT_HISTORY_LIMIT: usize = 10;
const MAX_HISTORY_LIMIT: usize = 100;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PricingEngine>,
    pub benchmarks: Arc<BenchmarkStore>,
    pub calculations: Arc<CalculationStore>,
    pub campaigns: Arc<CampaignStore>,
    /// Hex SHA-256 digest of the admin bearer token; admin routes are
    /// disabled when `None`.
    pub admin_token_digest: Option<String>,
    pub node_id: String,
    pub start_time: Instant,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    pub industry_id: Uuid,
    pub stream_length_minutes: f64,
    pub avg_view_time_minutes: f64,
    pub total_views: f64,
    #[serde(default)]
    pub selected_frequency: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct IndustryRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    pub calculation_id: Uuid,
    pub session_id: Uuid,
    pub industry: IndustryRef,
    pub multipliers: Vec<PremiumMultiplier>,
    pub calculation: streamrate_pricing::CalculationResult,
}

#[derive(Debug, Deserialize)]
pub struct MultiBrandRequest {
    pub calculation_id: Uuid,
    pub brands: Vec<BrandPlacementRequest>,
}

#[derive(Debug, Serialize)]
pub struct MultiBrandResponse {
    pub calculation_id: Uuid,
    pub result: MultiBrandResult,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct CalculationDetailResponse {
    pub calculation: StoredCalculation,
    pub ad_slots: Vec<AdSlot>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCampaignRequest {
    pub channel_name: String,
    pub streams: Vec<CampaignStreamRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CampaignStreamRequest {
    pub stream_type: String,
    pub calculation_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map engine/store failures onto HTTP statuses with JSON bodies.
pub fn into_api_error(err: PricingError) -> ApiError {
    let (status, code) = match &err {
        PricingError::Validation(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
        PricingError::CapacityExceeded { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "capacity_exceeded")
        }
        PricingError::DivisionDegeneracy(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "degenerate_input")
        }
        PricingError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    };
    (
        status,
        Json(ErrorResponse {
            error: code.to_string(),
            message: err.to_string(),
        }),
    )
}

fn not_found(what: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "not_found".to_string(),
            message: format!("{} not found", what),
        }),
    )
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// POST /api/v1/calculator/calculate
pub async fn calculate(
    State(state): State<AppState>,
    Json(req): Json<CalculateRequest>,
) -> Result<Json<CalculateResponse>, ApiError> {
    let industry = state
        .benchmarks
        .get_industry(req.industry_id)
        .ok_or_else(|| not_found("Industry"))?;

    let multipliers = state.benchmarks.list_active_multipliers();
    let input = CalculationInput {
        base_cpm: industry.video_cpm_avg,
        multipliers: multipliers.iter().map(|m| m.value).collect(),
        stream_length_minutes: req.stream_length_minutes,
        avg_view_time_minutes: req.avg_view_time_minutes,
        total_views: req.total_views,
        selected_frequency: req.selected_frequency,
    };

    let result = state.engine.valuate(&input).map_err(|e| {
        warn!(industry = %industry.slug, error = %e, "Valuation rejected");
        metrics::counter!("api.validation_errors").increment(1);
        into_api_error(e)
    })?;

    let stored = state
        .calculations
        .save(industry.id, &industry.name, result);
    metrics::counter!("calculator.calculations").increment(1);

    Ok(Json(CalculateResponse {
        calculation_id: stored.id,
        session_id: stored.session_id,
        industry: IndustryRef {
            id: industry.id,
            name: industry.name,
        },
        multipliers,
        calculation: stored.result,
    }))
}

/// POST /api/v1/calculator/multi-brand
pub async fn multi_brand(
    State(state): State<AppState>,
    Json(req): Json<MultiBrandRequest>,
) -> Result<Json<MultiBrandResponse>, ApiError> {
    let stored = state
        .calculations
        .get(req.calculation_id)
        .ok_or_else(|| not_found("Calculation"))?;

    let result = state
        .engine
        .split_across_brands(&stored.result, &req.brands)
        .map_err(|e| {
            warn!(calculation_id = %req.calculation_id, error = %e, "Multi-brand split rejected");
            metrics::counter!("api.validation_errors").increment(1);
            into_api_error(e)
        })?;

    state.calculations.record_slots(stored.id, &result);
    metrics::counter!("calculator.multi_brand_splits").increment(1);

    Ok(Json(MultiBrandResponse {
        calculation_id: stored.id,
        result,
    }))
}

/// GET /api/v1/calculator/history
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<Vec<HistoryEntry>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(MAX_HISTORY_LIMIT);
    Json(state.calculations.history(limit))
}

/// GET /api/v1/calculator/calculations/:id
pub async fn get_calculation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CalculationDetailResponse>, ApiError> {
    let calculation = state
        .calculations
        .get(id)
        .ok_or_else(|| not_found("Calculation"))?;
    let ad_slots = state.calculations.slots_for(id);
    Ok(Json(CalculationDetailResponse {
        calculation,
        ad_slots,
    }))
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// GET /api/v1/benchmarks/industries
pub async fn list_industries(State(state): State<AppState>) -> Json<Vec<Industry>> {
    Json(state.benchmarks.list_industries())
}

/// GET /api/v1/benchmarks/industries/:id
pub async fn get_industry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Industry>, ApiError> {
    state
        .benchmarks
        .get_industry(id)
        .map(Json)
        .ok_or_else(|| not_found("Industry"))
}

/// GET /api/v1/benchmarks/industries/slug/:slug
pub async fn get_industry_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Industry>, ApiError> {
    state
        .benchmarks
        .get_industry_by_slug(&slug)
        .map(Json)
        .ok_or_else(|| not_found("Industry"))
}

/// GET /api/v1/benchmarks/multipliers
pub async fn list_multipliers(State(state): State<AppState>) -> Json<Vec<PremiumMultiplier>> {
    Json(state.benchmarks.list_active_multipliers())
}

/// GET /api/v1/benchmarks/summary
pub async fn benchmarks_summary(State(state): State<AppState>) -> Json<BenchmarkSummary> {
    Json(state.benchmarks.summary())
}

// ---------------------------------------------------------------------------
// Campaigns
// ---------------------------------------------------------------------------

/// GET /api/v1/campaigns
pub async fn list_campaigns(State(state): State<AppState>) -> Json<Vec<CampaignSummary>> {
    Json(state.campaigns.list(&state.calculations))
}

/// POST /api/v1/campaigns
pub async fn create_campaign(
    State(state): State<AppState>,
    Json(req): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<CampaignDetail>), ApiError> {
    let entries: Vec<(String, Uuid)> = req
        .streams
        .into_iter()
        .map(|s| (s.stream_type, s.calculation_id))
        .collect();

    let detail = state
        .campaigns
        .create(&req.channel_name, &entries, &state.calculations)
        .map_err(into_api_error)?;
    metrics::counter!("campaigns.created").increment(1);

    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/v1/campaigns/:id
pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CampaignDetail>, ApiError> {
    state
        .campaigns
        .get(id, &state.calculations)
        .map(Json)
        .ok_or_else(|| not_found("Campaign"))
}

/// DELETE /api/v1/campaigns/:id
pub async fn delete_campaign(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    if state.campaigns.delete(id) {
        metrics::counter!("campaigns.deleted").increment(1);
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

// ---------------------------------------------------------------------------
// Operational
// ---------------------------------------------------------------------------

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /ready — readiness probe.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.benchmarks.list_active_multipliers().is_empty() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

/// GET /live — liveness probe.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}
