use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    services::{order_service, portfolio_service},
    AppState,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Option<String>,
}

// GET /api/holdings?userId=
pub async fn get_holdings(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Value>> {
    let user_id = order_service::resolve_user_id(&state, query.user_id.as_deref())?;

    let holdings = portfolio_service::list_holding_views(&state, &user_id)
        .await
        .map_err(|e| AppError::persistence("Failed to fetch holdings", e))?;

    Ok(Json(json!({ "success": true, "holdings": holdings })))
}

// GET /api/positions?userId=
pub async fn get_positions(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Value>> {
    let user_id = order_service::resolve_user_id(&state, query.user_id.as_deref())?;

    let positions = portfolio_service::list_position_views(&state, &user_id)
        .await
        .map_err(|e| AppError::persistence("Failed to fetch positions", e))?;

    Ok(Json(json!({ "success": true, "positions": positions })))
}

// GET /api/portfolio?userId=
pub async fn get_portfolio(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Value>> {
    let user_id = order_service::resolve_user_id(&state, query.user_id.as_deref())?;
    let today = Local::now().date_naive();

    let portfolio = portfolio_service::portfolio_summary(&state, &user_id, today)
        .await
        .map_err(|e| AppError::persistence("Failed to fetch portfolio", e))?;

    Ok(Json(json!({ "success": true, "portfolio": portfolio })))
}
