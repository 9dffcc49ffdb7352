use axum::{Router, routing::get};

use crate::{AppState, controllers::stocks_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/stocks/search", get(stocks_controller::get_search))
        .route("/api/stocks/:symbol", get(stocks_controller::get_details))
}
