use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, Query, State},
    response::Json,
};
use chrono::{DateTime, SecondsFormat};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::Order,
    services::order_service::{self, OrdersQuery, PlaceOrderRequest},
    AppState,
};

fn iso(ts_millis: i64) -> Value {
    DateTime::from_timestamp_millis(ts_millis)
        .map(|d| Value::String(d.to_rfc3339_opts(SecondsFormat::Millis, true)))
        .unwrap_or(Value::Null)
}

fn order_json(o: &Order) -> Value {
    json!({
        "id": o.id.to_hex(),
        "symbol": o.symbol,
        "name": o.name,
        "quantity": o.quantity,
        "price": o.price,
        "orderType": o.order_type,
        "productType": o.product_type,
        "validity": o.validity,
        "variety": o.variety,
        "status": o.status,
        "orderValue": o.order_value,
        "charges": o.charges,
        "timestamp": iso(o.timestamp),
        "cancelledAt": o.cancelled_at.map(iso),
        "exchange": o.exchange,
        "segment": o.segment,
    })
}

// POST /api/orders/place
pub async fn post_place_order(
    State(state): State<AppState>,
    payload: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(req) = payload.map_err(|e| {
        AppError::Validation(format!("Invalid order payload: {}", e.body_text()))
    })?;

    let placed = order_service::place_order(&state, &req).await?;
    let o = &placed.order;

    Ok(Json(json!({
        "success": true,
        "message": format!("{} order placed successfully", o.order_type),
        "orderId": o.id.to_hex(),
        "order": {
            "id": o.id.to_hex(),
            "symbol": o.symbol,
            "name": o.name,
            "quantity": o.quantity,
            "price": o.price,
            "orderType": o.order_type,
            "productType": o.product_type,
            "status": o.status,
            "orderValue": o.order_value,
            "charges": o.charges,
        },
        "settlement": placed.settlement,
    })))
}

// GET /api/orders?userId=&status=&limit=
pub async fn get_orders(
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> AppResult<Json<Value>> {
    let orders = order_service::list_orders(&state, &query).await?;
    let items: Vec<Value> = orders.iter().map(order_json).collect();

    Ok(Json(json!({ "success": true, "orders": items })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelBody {
    pub user_id: Option<String>,
}

// PUT /api/orders/:orderId/cancel
pub async fn put_cancel_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    body: Bytes,
) -> AppResult<Json<Value>> {
    // body is optional; an empty one means the default user
    let body: CancelBody = if body.iter().all(u8::is_ascii_whitespace) {
        CancelBody::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::Validation(format!("Invalid cancel payload: {e}")))?
    };

    let id = order_service::cancel_order(&state, &order_id, body.user_id.as_deref()).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Order cancelled successfully",
        "orderId": id.to_hex(),
    })))
}
