pub mod home_controller;
pub mod stocks_controller;
pub mod orders_controller;
pub mod portfolio_controller;
