mod common;

use axum::http::StatusCode;
use common::{get, place, test_state};
use serde_json::json;
use tradedesk::services::db_init;

#[tokio::test]
async fn holdings_are_marked_to_catalog_price() {
    let state = test_state();
    place(
        &state,
        json!({ "symbol": "INFY", "quantity": 10, "price": 1400, "orderType": "BUY" }),
    )
    .await;

    let (status, body) = get(&state, "/api/holdings?userId=demo_user").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let h = &body["holdings"][0];
    assert_eq!(h["symbol"], "INFY");
    assert_eq!(h["name"], "Infosys Ltd");
    assert_eq!(h["quantity"], 10);
    assert_eq!(h["avgCost"], 1400.0);
    assert_eq!(h["currentPrice"], 1432.8);
    assert!((h["value"].as_f64().unwrap() - 14328.0).abs() < 1e-6);
    assert!((h["pnl"].as_f64().unwrap() - 328.0).abs() < 1e-6);
    assert!((h["pnlPercent"].as_f64().unwrap() - 2.342857142857).abs() < 1e-6);
}

#[tokio::test]
async fn holdings_are_per_user() {
    let state = test_state();
    place(
        &state,
        json!({
            "symbol": "INFY", "quantity": 1, "price": 1400, "orderType": "BUY", "userId": "bob"
        }),
    )
    .await;

    let (_, body) = get(&state, "/api/holdings").await;
    assert!(body["holdings"].as_array().unwrap().is_empty());

    let (_, body) = get(&state, "/api/holdings?userId=bob").await;
    assert_eq!(body["holdings"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_user_id_is_400() {
    let state = test_state();
    let (status, body) = get(&state, "/api/holdings?userId=%24where").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid userId");
}

#[tokio::test]
async fn positions_list_seeded_demo_rows() {
    let state = test_state();

    let (status, body) = get(&state, "/api/positions").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["positions"].as_array().unwrap().is_empty());

    db_init::seed_demo_positions(state.store.as_ref(), "demo_user").await.unwrap();

    let (_, body) = get(&state, "/api/positions").await;
    let positions = body["positions"].as_array().unwrap();
    assert_eq!(positions.len(), 2);
    assert_eq!(positions[0]["product"], "CNC");
    assert_eq!(positions[0]["symbol"], "EVEREADY");
    assert_eq!(positions[0]["isLoss"], true);
    assert_eq!(positions[1]["net"], "+10.04%");
}

#[tokio::test]
async fn portfolio_summary_aggregates_holdings() {
    let state = test_state();
    place(
        &state,
        json!({ "symbol": "INFY", "quantity": 10, "price": 1400, "orderType": "BUY" }),
    )
    .await;
    place(
        &state,
        json!({ "symbol": "TCS", "quantity": 2, "price": 3500, "orderType": "BUY" }),
    )
    .await;

    let (status, body) = get(&state, "/api/portfolio").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let p = &body["portfolio"];
    assert!((p["totalInvestment"].as_f64().unwrap() - 21000.0).abs() < 1e-6);
    assert!((p["currentValue"].as_f64().unwrap() - 21171.0).abs() < 1e-6);
    assert!((p["totalPnL"].as_f64().unwrap() - 171.0).abs() < 1e-6);
    assert!((p["totalPnLPercent"].as_f64().unwrap() - 171.0 / 21000.0 * 100.0).abs() < 1e-6);
    assert_eq!(p["totalHoldings"], 2);
    // placed orders stay PENDING; only COMPLETE ones count
    assert_eq!(p["todayOrders"], 0);
    assert_eq!(p["totalOrders"], 0);
}

#[tokio::test]
async fn empty_portfolio_has_zero_percent() {
    let state = test_state();
    let (status, body) = get(&state, "/api/portfolio?userId=nobody").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["portfolio"]["totalPnLPercent"], 0.0);
    assert_eq!(body["portfolio"]["totalHoldings"], 0);
}

#[tokio::test]
async fn health_and_fallback() {
    let state = test_state();

    let (status, _) = get(&state, "/health").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(&state, "/health/db").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&state, "/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}
