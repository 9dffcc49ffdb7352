use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{controllers::home_controller, AppState};

pub mod home_routes;
pub mod stocks_routes;
pub mod orders_routes;
pub mod portfolio_routes;

pub fn app(state: AppState) -> Router {
    let router = Router::<AppState>::new();

    let router = home_routes::add_routes(router);
    let router = stocks_routes::add_routes(router);
    let router = orders_routes::add_routes(router);
    let router = portfolio_routes::add_routes(router);

    router
        .fallback(home_controller::not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
