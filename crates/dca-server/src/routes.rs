//! Router

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{
    compare_assets, cost_basis_handler, export_csv, fire_handler, health_check, inflation_handler,
    projection_handler, savings_handler, share_decode, share_encode, simulate_handler,
};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(health_check))

        // Simulation
        .route("/api/simulate", post(simulate_handler))
        .route("/api/export/csv", post(export_csv))
        .route("/api/assets/compare", post(compare_assets))

        // Share links
        .route("/api/share/encode", post(share_encode))
        .route("/api/share/decode", get(share_decode))

        // Analytics
        .route("/api/analytics/projection", post(projection_handler))
        .route("/api/analytics/fire", post(fire_handler))
        .route("/api/analytics/savings", post(savings_handler))
        .route("/api/analytics/inflation", post(inflation_handler))
        .route("/api/analytics/cost-basis", post(cost_basis_handler))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use chrono::{DateTime, NaiveDate, Utc};
    use dca_engine::exchange::{Clock, MockPriceSource};
    use dca_engine::PriceSample;
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::ServerConfig;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn flat_btc() -> Vec<PriceSample> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        (0..60)
            .map(|i| PriceSample::at_date(start + chrono::Days::new(i), Decimal::from(10_000)))
            .collect()
    }

    fn app_with(source: MockPriceSource) -> Router {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap().and_hms_opt(12, 0, 0).unwrap().and_utc();
        let state = AppState::new(Arc::new(source), ServerConfig::default()).with_clock(Arc::new(FixedClock(today)));
        router(state)
    }

    fn app() -> Router {
        app_with(MockPriceSource::new().with_series("BTC", flat_btc()))
    }

    fn weekly_params(mode: &str) -> Value {
        json!({
            "amountPerPurchase": "100",
            "frequency": "weekly",
            "startDate": "2020-01-01",
            "endDate": "2020-01-29",
            "feePercent": "0",
            "priceMode": mode,
            "manualPrice": "10000"
        })
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn decimal(value: &Value) -> Decimal {
        match value {
            Value::String(s) => s.parse().unwrap(),
            other => other.to_string().parse().unwrap(),
        }
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["price_source"], "MockPriceSource");
    }

    #[tokio::test]
    async fn test_simulate_fetches_history() {
        let (status, body) = post_json(app(), "/api/simulate", json!({ "params": weekly_params("api") })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["asset"], "BTC");
        assert_eq!(body["simulation"]["breakdown"].as_array().unwrap().len(), 5);
        assert_eq!(decimal(&body["simulation"]["totalInvested"]), Decimal::from(500));
        assert_eq!(decimal(&body["simulation"]["currentValue"]), Decimal::from(500));
        assert_eq!(decimal(&body["lumpSum"]["currentValue"]), Decimal::from(500));
        assert_eq!(body["comparison"]["winner"], "tie");
        assert!(body["shareQuery"].as_str().unwrap().contains("frequency=weekly"));
    }

    #[tokio::test]
    async fn test_manual_mode_needs_no_source() {
        let (status, body) = post_json(
            app_with(MockPriceSource::unavailable()),
            "/api/simulate",
            json!({ "params": weekly_params("manual") }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(decimal(&body["simulation"]["unitsAccumulated"]), Decimal::from_str_exact("0.05").unwrap());
        assert_eq!(decimal(&body["lumpSum"]["unitsAccumulated"]), Decimal::from_str_exact("0.05").unwrap());
    }

    #[tokio::test]
    async fn test_source_outage_is_bad_gateway() {
        let (status, body) = post_json(
            app_with(MockPriceSource::unavailable()),
            "/api/simulate",
            json!({ "params": weekly_params("api") }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "PRICE_SOURCE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_unknown_asset_is_not_found() {
        let (status, body) = post_json(
            app(),
            "/api/simulate",
            json!({ "params": weekly_params("api"), "asset": "doge" }),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "UNSUPPORTED_ASSET");
    }

    #[tokio::test]
    async fn test_export_csv_attachment() {
        let response = app()
            .oneshot(
                Request::post("/api/export/csv")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "params": weekly_params("api") }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"btc-dca-2020-01-01-to-2020-01-29.csv\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with('\u{feff}'));
        assert_eq!(text.lines().count(), 6);
    }

    #[tokio::test]
    async fn test_share_decode_applies_to_defaults() {
        let response = app()
            .oneshot(
                Request::get("/api/share/decode?amount=250&frequency=monthly&fee=abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(decimal(&body["params"]["amountPerPurchase"]), Decimal::from(250));
        assert_eq!(body["params"]["frequency"], "monthly");
        assert_eq!(body["params"]["endDate"], "2025-06-15");
        assert_eq!(decimal(&body["params"]["feePercent"]), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_share_decode_without_query() {
        let response = app()
            .oneshot(Request::get("/api/share/decode").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();

        assert!(body["overrides"].is_null());
        assert_eq!(body["params"]["frequency"], "weekly");
    }

    #[tokio::test]
    async fn test_compare_assets_with_inline_series() {
        let gold: Vec<PriceSample> = flat_btc().into_iter().map(|s| PriceSample::new(s.timestamp_ms, Decimal::from(2000))).collect();
        let (status, body) = post_json(
            app(),
            "/api/assets/compare",
            json!({
                "params": weekly_params("manual"),
                "assets": [
                    { "asset": "btc" },
                    { "asset": "GOLD", "label": "Gold", "prices": gold }
                ]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let results = body.as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1]["label"], "Gold");
        assert_eq!(decimal(&results[1]["unitsAccumulated"]), Decimal::from_str_exact("0.25").unwrap());
    }

    #[tokio::test]
    async fn test_fire_defaults_to_standard_scenarios() {
        let (status, body) = post_json(
            app(),
            "/api/analytics/fire",
            json!({ "simulation": { "params": weekly_params("api") }, "monthlyExpenses": "2000" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scenarios"].as_array().unwrap().len(), 3);
        assert_eq!(decimal(&body["fireTarget"]), Decimal::from(600_000));
    }

    #[tokio::test]
    async fn test_negative_expenses_rejected() {
        let (status, body) = post_json(
            app(),
            "/api/analytics/fire",
            json!({ "simulation": { "params": weekly_params("api") }, "monthlyExpenses": "-1" }),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "INVALID_EXPENSES");
    }

    #[tokio::test]
    async fn test_fire_with_unrepresentable_expenses() {
        let (status, body) = post_json(
            app(),
            "/api/analytics/fire",
            json!({
                "simulation": { "params": weekly_params("api") },
                "monthlyExpenses": "10000000000000000000000000000"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(decimal(&body["fireTarget"]), Decimal::MAX);
        for scenario in body["scenarios"].as_array().unwrap() {
            assert_eq!(scenario["outcome"]["status"], "notReached");
        }
    }

    #[tokio::test]
    async fn test_simulate_with_huge_amount_saturates() {
        let mut params = weekly_params("manual");
        params["amountPerPurchase"] = json!("50000000000000000000000000000");
        let (status, body) = post_json(app(), "/api/simulate", json!({ "params": params })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(decimal(&body["simulation"]["totalInvested"]), Decimal::MAX);
        assert_eq!(body["simulation"]["breakdown"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_savings_zero_apy() {
        let (status, body) = post_json(
            app(),
            "/api/analytics/savings",
            json!({ "params": weekly_params("api"), "apyPercent": "0" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(decimal(&body["finalBalance"]), Decimal::from(500));
    }

    #[tokio::test]
    async fn test_cost_basis_single_position() {
        let (status, body) = post_json(
            app(),
            "/api/analytics/cost-basis",
            json!({
                "positions": [{
                    "label": "Weekly",
                    "startDate": "2020-01-01",
                    "endDate": "2020-01-29",
                    "amountPerPurchase": "100",
                    "frequency": "weekly"
                }],
                "template": weekly_params("api")
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(decimal(&body["totals"]["totalInvested"]), Decimal::from(500));
        assert_eq!(decimal(&body["totals"]["weightedAverageCost"]), Decimal::from(10_000));
        assert!(!body["positions"][0]["id"].as_str().unwrap().is_empty());
    }
}
