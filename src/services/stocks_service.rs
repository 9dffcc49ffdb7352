use crate::{
    error::{AppError, AppResult},
    models::Stock,
    AppState,
};

pub const SEARCH_LIMIT: usize = 10;

/// Empty query => first page of the catalog.
pub fn search(state: &AppState, query: &str) -> Vec<Stock> {
    state.catalog.search(query, SEARCH_LIMIT)
}

pub fn details(state: &AppState, symbol: &str) -> AppResult<Stock> {
    state
        .catalog
        .get(symbol)
        .ok_or_else(|| AppError::NotFound("Stock not found".into()))
}
