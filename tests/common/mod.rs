#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use tradedesk::{config::Settings, routes, AppState};

pub fn test_state() -> AppState {
    AppState::in_memory(Settings::default())
}

pub async fn send(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
    let res = routes::app(state.clone()).oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub async fn get(state: &AppState, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(state, req).await
}

pub async fn send_json(
    state: &AppState,
    method: &str,
    uri: &str,
    body: Value,
) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(state, req).await
}

pub async fn place(state: &AppState, body: Value) -> (StatusCode, Value) {
    send_json(state, "POST", "/api/orders/place", body).await
}
