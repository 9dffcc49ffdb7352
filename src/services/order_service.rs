use std::sync::OnceLock;

use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use regex::Regex;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::{
    error::{AppError, AppResult},
    models::{Order, OrderStatus, OrderType, Stock},
    AppState,
};

use super::{
    charges,
    settlement::{self, SettlementOutcome, SettlementRequest},
    store::OrderFilter,
};

pub const DEFAULT_PRODUCT_TYPE: &str = "INTRADAY";
pub const DEFAULT_VALIDITY: &str = "DAY";
pub const DEFAULT_VARIETY: &str = "NORMAL";
pub const EXCHANGE: &str = "NSE";
pub const SEGMENT: &str = "EQUITY";

pub const MAX_ORDERS_LIMIT: i64 = 500;

// 2^63: the first integer an i64 quantity cannot hold
const QUANTITY_BOUND: f64 = 9_223_372_036_854_775_808.0;

const REQUIRED_FIELDS: &str = "Symbol, quantity, and price are required";

/// A JSON number or a numeric string; clients send both.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    pub fn value(&self) -> Option<f64> {
        match self {
            NumericInput::Number(n) => Some(*n),
            NumericInput::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub symbol: Option<String>,
    pub quantity: Option<NumericInput>,
    pub price: Option<NumericInput>,
    pub order_type: Option<String>,
    pub product_type: Option<String>,
    pub validity: Option<String>,
    pub variety: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidatedOrder {
    pub stock: Stock,
    pub quantity: i64,
    pub price: f64,
    pub order_type: OrderType,
    pub product_type: String,
    pub validity: String,
    pub variety: String,
    pub user_id: String,
}

#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub settlement: SettlementOutcome,
}

fn user_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.@-]{1,64}$").expect("user id pattern"))
}

/// Falls back to the configured demo user; rejects ids that are not plain tokens.
pub fn resolve_user_id(state: &AppState, raw: Option<&str>) -> AppResult<String> {
    let user_id = match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => state.settings.default_user_id.clone(),
    };

    if !user_id_re().is_match(&user_id) {
        return Err(AppError::Validation("Invalid userId".into()));
    }
    Ok(user_id)
}

// Labels are stored as sent; blank ones fall back to the default.
fn label_or(raw: Option<&str>, default: &str) -> String {
    match raw {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => default.to_string(),
    }
}

pub fn validate(state: &AppState, req: &PlaceOrderRequest) -> AppResult<ValidatedOrder> {
    let symbol = req
        .symbol
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let (Some(symbol), Some(quantity), Some(price)) =
        (symbol, req.quantity.as_ref(), req.price.as_ref())
    else {
        return Err(AppError::Validation(REQUIRED_FIELDS.into()));
    };

    let quantity = quantity
        .value()
        .ok_or_else(|| AppError::Validation("Quantity must be a positive integer".into()))?;
    let price = price
        .value()
        .ok_or_else(|| AppError::Validation("Price must be a positive number".into()))?;

    if quantity == 0.0 || price == 0.0 {
        return Err(AppError::Validation(REQUIRED_FIELDS.into()));
    }
    if !quantity.is_finite()
        || quantity < 0.0
        || quantity.fract() != 0.0
        || quantity >= QUANTITY_BOUND
    {
        return Err(AppError::Validation("Quantity must be a positive integer".into()));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::Validation("Price must be a positive number".into()));
    }

    let order_type = match req.order_type.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.parse::<OrderType>().map_err(AppError::Validation)?,
        _ => OrderType::default(),
    };

    let user_id = resolve_user_id(state, req.user_id.as_deref())?;

    let stock = state
        .catalog
        .get(symbol)
        .ok_or_else(|| AppError::Validation("Invalid stock symbol".into()))?;

    Ok(ValidatedOrder {
        stock,
        quantity: quantity as i64,
        price,
        order_type,
        product_type: label_or(req.product_type.as_deref(), DEFAULT_PRODUCT_TYPE),
        validity: label_or(req.validity.as_deref(), DEFAULT_VALIDITY),
        variety: label_or(req.variety.as_deref(), DEFAULT_VARIETY),
        user_id,
    })
}

/// Records the order, then settles it against the holding.
///
/// The two writes are a saga: if settlement fails, the order is cancelled
/// again and the caller gets the persistence error.
pub async fn place_order(state: &AppState, req: &PlaceOrderRequest) -> AppResult<PlacedOrder> {
    let v = validate(state, req)?;

    let breakdown = charges::compute(v.quantity, v.price);
    if !breakdown.is_finite() {
        return Err(AppError::Validation("Order value is out of range".into()));
    }

    let order = Order {
        id: ObjectId::new(),
        user_id: v.user_id.clone(),
        symbol: v.stock.symbol.clone(),
        name: v.stock.name.clone(),
        quantity: v.quantity,
        price: v.price,
        order_type: v.order_type,
        product_type: v.product_type,
        validity: v.validity,
        variety: v.variety,
        status: OrderStatus::Pending,
        order_value: breakdown.order_value,
        charges: breakdown.to_charges(),
        exchange: EXCHANGE.to_string(),
        segment: SEGMENT.to_string(),
        timestamp: Utc::now().timestamp_millis(),
        cancelled_at: None,
    };

    state
        .store
        .insert_order(&order)
        .await
        .map_err(|e| AppError::persistence("Failed to place order", e))?;

    info!(
        order_id = %order.id,
        user_id = %order.user_id,
        symbol = %order.symbol,
        quantity = order.quantity,
        price = order.price,
        order_type = %order.order_type,
        "order placed"
    );

    let settle_req = SettlementRequest {
        user_id: &order.user_id,
        symbol: &order.symbol,
        name: &order.name,
        quantity: order.quantity,
        order_type: order.order_type,
        price: order.price,
    };

    let settlement = match settlement::settle(state, &settle_req).await {
        Ok(outcome) => outcome,
        Err(e) => {
            compensate(state, &order).await;
            return Err(AppError::persistence("Failed to place order", e));
        }
    };

    if settlement.is_skipped() {
        warn!(
            order_id = %order.id,
            user_id = %order.user_id,
            symbol = %order.symbol,
            quantity = order.quantity,
            ?settlement,
            "sell not covered by holding; holding left unchanged"
        );
    }

    Ok(PlacedOrder { order, settlement })
}

async fn compensate(state: &AppState, order: &Order) {
    let now = Utc::now().timestamp_millis();
    match state.store.cancel_pending_order(order.id, now).await {
        Ok(true) => warn!(order_id = %order.id, "settlement failed; order cancelled"),
        Ok(false) => warn!(order_id = %order.id, "settlement failed; order was no longer pending"),
        Err(e) => error!(
            order_id = %order.id,
            error = %e,
            "settlement failed and order could not be cancelled"
        ),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersQuery {
    pub user_id: Option<String>,
    pub status: Option<String>,
    pub limit: Option<String>,
}

pub async fn list_orders(state: &AppState, query: &OrdersQuery) -> AppResult<Vec<Order>> {
    let user_id = resolve_user_id(state, query.user_id.as_deref())?;

    let status = match query.status.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => Some(s.parse::<OrderStatus>().map_err(AppError::Validation)?),
        _ => None,
    };

    let limit = match query.limit.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s
            .parse::<i64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| AppError::Validation("limit must be a positive integer".into()))?,
        _ => state.settings.orders_default_limit,
    };

    let filter = OrderFilter {
        user_id,
        status,
        limit: Some(limit.min(MAX_ORDERS_LIMIT)),
    };

    state
        .store
        .list_orders(&filter)
        .await
        .map_err(|e| AppError::persistence("Failed to fetch orders", e))
}

/// PENDING -> CANCELLED. Unknown ids and other users' orders are "not found".
pub async fn cancel_order(
    state: &AppState,
    order_id: &str,
    user_id: Option<&str>,
) -> AppResult<ObjectId> {
    let user_id = resolve_user_id(state, user_id)?;

    let id = ObjectId::parse_str(order_id.trim())
        .map_err(|_| AppError::NotFound("Order not found".into()))?;

    let order = state
        .store
        .find_order(id, &user_id)
        .await
        .map_err(|e| AppError::persistence("Failed to cancel order", e))?
        .ok_or_else(|| AppError::NotFound("Order not found".into()))?;

    match order.status {
        OrderStatus::Complete => {
            return Err(AppError::InvalidState("Cannot cancel completed order".into()));
        }
        OrderStatus::Cancelled => {
            return Err(AppError::InvalidState("Order already cancelled".into()));
        }
        OrderStatus::Pending => {}
    }

    let cancelled = state
        .store
        .cancel_pending_order(id, Utc::now().timestamp_millis())
        .await
        .map_err(|e| AppError::persistence("Failed to cancel order", e))?;

    if !cancelled {
        return Err(AppError::InvalidState("Order is no longer pending".into()));
    }

    info!(order_id = %id, user_id = %user_id, "order cancelled");
    Ok(id)
}
