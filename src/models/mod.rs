pub mod order;
pub mod holding;
pub mod position;
pub mod stock;

pub use order::{Charges, Order, OrderStatus, OrderType};
pub use holding::Holding;
pub use position::Position;
pub use stock::Stock;
