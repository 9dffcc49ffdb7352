use axum::{Router, routing::{get, post, put}};

use crate::{AppState, controllers::orders_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/orders", get(orders_controller::get_orders))
        .route("/api/orders/place", post(orders_controller::post_place_order))
        .route("/api/orders/:order_id/cancel", put(orders_controller::put_cancel_order))
}
