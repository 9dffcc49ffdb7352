pub mod store;
pub mod catalog;
pub mod db_init;
pub mod key_lock;

pub mod charges;
pub mod settlement;
pub mod order_service;
pub mod portfolio_service;
pub mod stocks_service;
