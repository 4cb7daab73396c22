//! HTTP Handlers

use axum::{
    extract::{RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use dca_engine::analytics::{
    adjust_for_inflation, adjust_for_money_supply, aggregate_positions, project, project_fire, savings_comparison,
    track_milestones, CostBasisSummary, FireProjection, FutureProjection, GrowthModel, GrowthScenario,
    InflationAdjustment, MilestoneProgress, MoneySupplyAdjustment, ProjectionInput, SavingsComparison,
    DEFAULT_MILESTONES,
};
use dca_engine::share::{csv_filename, from_query_string, render_breakdown, to_query_string, ParamOverrides};
use dca_engine::strategy::{
    compare_strategies, lump_sum_with_index, simulate_asset, simulate_with_index, AssetDcaResult, StrategyComparison,
};
use dca_engine::{
    CostBasisPosition, DcaError, LumpSumResult, PriceIndex, PriceMode, PriceSample, SimulationParameters,
    SimulationResult,
};

use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub price_source: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// A schedule plus, optionally, the history to run it against.
///
/// Without `prices` in API mode the history is loaded from the configured
/// price source for `asset` (default asset when absent).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateRequest {
    pub params: SimulationParameters,
    pub asset: Option<String>,
    pub prices: Option<Vec<PriceSample>>,
    pub current_price: Option<Decimal>,
    pub milestones: Option<Vec<Decimal>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateResponse {
    pub asset: String,
    pub simulation: SimulationResult,
    pub lump_sum: LumpSumResult,
    pub comparison: StrategyComparison,
    pub milestones: MilestoneProgress,
    /// Query string that restores these parameters
    pub share_query: String,
}

#[derive(Debug, Serialize)]
pub struct ShareEncodeResponse {
    pub query: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareDecodeResponse {
    /// Defaults with every valid link field applied
    pub params: SimulationParameters,
    pub overrides: Option<ParamOverrides>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRequest {
    pub asset: String,
    pub label: Option<String>,
    pub prices: Option<Vec<PriceSample>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetCompareRequest {
    pub params: SimulationParameters,
    pub assets: Vec<AssetRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRequest {
    pub simulation: SimulateRequest,
    pub target_date: NaiveDate,
    pub model: GrowthModel,
    /// Defaults to today
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FireRequest {
    pub simulation: SimulateRequest,
    pub monthly_expenses: Decimal,
    /// Defaults to the conservative / moderate / optimistic set
    pub scenarios: Option<Vec<GrowthScenario>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsRequest {
    pub params: SimulationParameters,
    pub apy_percent: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InflationRequest {
    pub simulation: SimulateRequest,
    pub cpi: Vec<PriceSample>,
    #[serde(default)]
    pub m2: Vec<PriceSample>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InflationResponse {
    pub inflation: Option<InflationAdjustment>,
    pub money_supply: Option<MoneySupplyAdjustment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBasisRequest {
    pub positions: Vec<CostBasisPosition>,
    /// Price mode and manual price shared by all positions
    pub template: Option<SimulationParameters>,
    pub asset: Option<String>,
    pub prices: Option<Vec<PriceSample>>,
    pub current_price: Option<Decimal>,
}

// ============================================================================
// Helpers
// ============================================================================

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

fn source_error(e: &DcaError) -> ApiError {
    let (status, code) = match e {
        DcaError::PriceSource(_) | DcaError::Io(_) => (StatusCode::BAD_GATEWAY, "PRICE_SOURCE_UNAVAILABLE"),
        DcaError::MalformedFeed(_) => (StatusCode::BAD_GATEWAY, "MALFORMED_FEED"),
        DcaError::UnsupportedAsset(_) => (StatusCode::NOT_FOUND, "UNSUPPORTED_ASSET"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };
    tracing::warn!(code, retryable = e.is_retryable(), "price source error: {}", e);
    api_error(status, code, e.user_message())
}

fn asset_or_default(state: &AppState, asset: Option<&str>) -> String {
    asset
        .map(|a| a.trim().to_uppercase())
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| state.config.default_asset.clone())
}

/// Inline series, nothing (manual mode), or a fetch from the price source
async fn load_prices(
    state: &AppState,
    asset: &str,
    inline: Option<Vec<PriceSample>>,
    mode: PriceMode,
) -> Result<Vec<PriceSample>, ApiError> {
    match (inline, mode) {
        (Some(prices), _) => Ok(prices),
        (None, PriceMode::Manual) => Ok(Vec::new()),
        (None, PriceMode::Api) => state.prices.price_history(asset).await.map_err(|e| source_error(&e)),
    }
}

struct Simulated {
    asset: String,
    index: PriceIndex,
    result: SimulationResult,
}

async fn run_simulation(state: &AppState, request: &SimulateRequest) -> Result<Simulated, ApiError> {
    let asset = asset_or_default(state, request.asset.as_deref());
    let prices = load_prices(state, &asset, request.prices.clone(), request.params.price_mode).await?;
    let index = PriceIndex::new(&prices);
    let result = simulate_with_index(&request.params, &index, request.current_price);
    Ok(Simulated { asset, index, result })
}

fn lump_sum_for(params: &SimulationParameters, simulated: &Simulated) -> LumpSumResult {
    // Manual mode has no history; enter at the manual price on the start date.
    let manual;
    let index = if simulated.index.is_empty() && params.price_mode == PriceMode::Manual {
        manual = PriceIndex::new(&[PriceSample::at_date(params.start_date, params.manual_price)]);
        &manual
    } else {
        &simulated.index
    };
    lump_sum_with_index(
        simulated.result.total_invested,
        params.start_date,
        index,
        simulated.result.final_price,
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        price_source: state.prices.name().to_string(),
    })
}

/// Simulation with lump-sum comparison and milestone progress
pub async fn simulate_handler(
    State(state): State<AppState>,
    Json(payload): Json<SimulateRequest>,
) -> Result<Json<SimulateResponse>, ApiError> {
    let simulated = run_simulation(&state, &payload).await?;
    let lump_sum = lump_sum_for(&payload.params, &simulated);
    let comparison = compare_strategies(&simulated.result, &lump_sum);
    let milestones = track_milestones(
        &simulated.result,
        payload.milestones.as_deref().unwrap_or(&DEFAULT_MILESTONES),
    );

    tracing::info!(
        asset = %simulated.asset,
        purchases = simulated.result.breakdown.len(),
        roi = %simulated.result.roi_percent,
        "simulation served"
    );

    Ok(Json(SimulateResponse {
        asset: simulated.asset,
        share_query: to_query_string(&payload.params),
        simulation: simulated.result,
        lump_sum,
        comparison,
        milestones,
    }))
}

/// Breakdown ledger as a CSV attachment
pub async fn export_csv(
    State(state): State<AppState>,
    Json(payload): Json<SimulateRequest>,
) -> Result<Response, ApiError> {
    let simulated = run_simulation(&state, &payload).await?;
    let body = render_breakdown(&simulated.result.breakdown, &simulated.asset).map_err(|e| {
        tracing::error!("CSV render error: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "EXPORT_FAILED", e.user_message())
    })?;
    let filename = csv_filename(
        &format!("{} DCA", simulated.asset),
        payload.params.start_date,
        payload.params.end_date,
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        body,
    )
        .into_response())
}

pub async fn share_encode(Json(params): Json<SimulationParameters>) -> Json<ShareEncodeResponse> {
    Json(ShareEncodeResponse {
        query: to_query_string(&params),
    })
}

/// Restore parameters from a link query, falling back to today's defaults
pub async fn share_decode(State(state): State<AppState>, RawQuery(query): RawQuery) -> Json<ShareDecodeResponse> {
    let defaults = SimulationParameters::defaults_as_of(state.today());
    let overrides = query.as_deref().and_then(from_query_string);
    let params = overrides.as_ref().map_or_else(|| defaults.clone(), |o| o.apply_to(&defaults));

    Json(ShareDecodeResponse { params, overrides })
}

/// Same schedule run into several assets
pub async fn compare_assets(
    State(state): State<AppState>,
    Json(payload): Json<AssetCompareRequest>,
) -> Result<Json<Vec<AssetDcaResult>>, ApiError> {
    let mut results = Vec::with_capacity(payload.assets.len());
    for request in payload.assets {
        let asset = asset_or_default(&state, Some(&request.asset));
        // Benchmarks always use their own history, whatever the price mode.
        let prices = load_prices(&state, &asset, request.prices, PriceMode::Api).await?;
        let label = request.label.unwrap_or_else(|| asset.clone());
        results.push(simulate_asset(&asset, &label, &payload.params, &prices));
    }
    Ok(Json(results))
}

pub async fn projection_handler(
    State(state): State<AppState>,
    Json(payload): Json<ProjectionRequest>,
) -> Result<Json<FutureProjection>, ApiError> {
    let simulated = run_simulation(&state, &payload.simulation).await?;
    let input = ProjectionInput {
        current_price: simulated.result.final_price,
        as_of: payload.as_of.unwrap_or_else(|| state.today()),
        target_date: payload.target_date,
        model: payload.model,
    };
    Ok(Json(project(&simulated.result, &payload.simulation.params, &input)))
}

pub async fn fire_handler(
    State(state): State<AppState>,
    Json(payload): Json<FireRequest>,
) -> Result<Json<FireProjection>, ApiError> {
    if payload.monthly_expenses < Decimal::ZERO {
        return Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "INVALID_EXPENSES",
            "Monthly expenses cannot be negative.",
        ));
    }
    let simulated = run_simulation(&state, &payload.simulation).await?;
    let scenarios = payload.scenarios.unwrap_or_else(GrowthScenario::standard);
    Ok(Json(project_fire(
        payload.monthly_expenses,
        simulated.result.current_value,
        &payload.simulation.params,
        &scenarios,
    )))
}

pub async fn savings_handler(Json(payload): Json<SavingsRequest>) -> Json<SavingsComparison> {
    Json(savings_comparison(&payload.params, payload.apy_percent))
}

pub async fn inflation_handler(
    State(state): State<AppState>,
    Json(payload): Json<InflationRequest>,
) -> Result<Json<InflationResponse>, ApiError> {
    let simulated = run_simulation(&state, &payload.simulation).await?;
    let params = &payload.simulation.params;
    Ok(Json(InflationResponse {
        inflation: adjust_for_inflation(&simulated.result, &payload.cpi, params.start_date, params.end_date),
        money_supply: adjust_for_money_supply(
            simulated.result.current_value,
            &payload.m2,
            params.start_date,
            params.end_date,
        ),
    }))
}

pub async fn cost_basis_handler(
    State(state): State<AppState>,
    Json(payload): Json<CostBasisRequest>,
) -> Result<Json<CostBasisSummary>, ApiError> {
    let template = payload
        .template
        .unwrap_or_else(|| SimulationParameters::defaults_as_of(state.today()));
    let asset = asset_or_default(&state, payload.asset.as_deref());
    let prices = load_prices(&state, &asset, payload.prices, template.price_mode).await?;

    Ok(Json(aggregate_positions(
        &payload.positions,
        &template,
        &PriceIndex::new(&prices),
        payload.current_price,
    )))
}
