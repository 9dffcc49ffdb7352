use axum::{Router, routing::get};

use crate::{AppState, controllers::portfolio_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/holdings", get(portfolio_controller::get_holdings))
        .route("/api/positions", get(portfolio_controller::get_positions))
        .route("/api/portfolio", get(portfolio_controller::get_portfolio))
}
