mod common;

use axum::http::StatusCode;
use common::{get, test_state};

#[tokio::test]
async fn search_tc_returns_only_tcs() {
    let state = test_state();
    let (status, body) = get(&state, "/api/stocks/search?q=tc").await;
    assert_eq!(status, StatusCode::OK);

    let hits = body.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["symbol"], "TCS");
    assert_eq!(hits[0]["name"], "Tata Consultancy Services");
    assert_eq!(hits[0]["price"], 3421.5);
    assert_eq!(hits[0]["change"], -0.8);
    assert_eq!(hits[0]["sector"], "IT");
}

#[tokio::test]
async fn search_matches_names_case_insensitively() {
    let state = test_state();
    let (_, body) = get(&state, "/api/stocks/search?q=Infosys").await;
    let hits = body.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["symbol"], "INFY");
}

#[tokio::test]
async fn search_without_query_is_capped_at_ten() {
    let state = test_state();
    let (status, body) = get(&state, "/api/stocks/search").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn search_with_no_hits_is_empty_array() {
    let state = test_state();
    let (status, body) = get(&state, "/api/stocks/search?q=zzz").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn details_are_case_insensitive() {
    let state = test_state();
    let (status, body) = get(&state, "/api/stocks/sbin").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], "SBIN");
    assert_eq!(body["price"], 523.4);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn details_decode_escaped_symbols() {
    let state = test_state();
    let (status, body) = get(&state, "/api/stocks/M%26M").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Mahindra & Mahindra Ltd");
}

#[tokio::test]
async fn unknown_stock_is_404() {
    let state = test_state();
    let (status, body) = get(&state, "/api/stocks/AAPL").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Stock not found");
}
