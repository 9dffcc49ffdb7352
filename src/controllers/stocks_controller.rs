use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{error::AppResult, models::Stock, services::stocks_service, AppState};

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

// GET /api/stocks/search?q=
pub async fn get_search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Stock>> {
    let q = query.q.unwrap_or_default();
    Json(stocks_service::search(&state, &q))
}

// GET /api/stocks/:symbol
pub async fn get_details(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> AppResult<Json<Value>> {
    let stock = stocks_service::details(&state, &symbol)?;

    Ok(Json(json!({
        "symbol": stock.symbol,
        "name": stock.name,
        "price": stock.price,
        "change": stock.change,
        "sector": stock.sector,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}
