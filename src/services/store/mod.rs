//! Persistence seam for orders, holdings and positions.
//!
//! Services only talk to [`Store`]; `MongoStore` backs the running server and
//! `MemoryStore` backs tests and `STORE_BACKEND=memory`.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

use crate::models::{Holding, Order, OrderStatus, Position};

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("mongo error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("rejected write: {0}")]
    Rejected(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone)]
pub struct OrderFilter {
    pub user_id: String,
    pub status: Option<OrderStatus>,
    // newest first; None means no limit
    pub limit: Option<i64>,
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    async fn insert_order(&self, order: &Order) -> StoreResult<()>;

    async fn find_order(&self, id: ObjectId, user_id: &str) -> StoreResult<Option<Order>>;

    async fn list_orders(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>>;

    /// Flips a PENDING order to CANCELLED. Returns `false` when the order was
    /// not pending anymore (or does not exist).
    async fn cancel_pending_order(&self, id: ObjectId, cancelled_at: i64) -> StoreResult<bool>;

    async fn find_holding(&self, user_id: &str, symbol: &str) -> StoreResult<Option<Holding>>;

    async fn list_holdings(&self, user_id: &str) -> StoreResult<Vec<Holding>>;

    /// Fails with [`StoreError::Conflict`] when (user_id, symbol) already exists.
    async fn insert_holding(&self, holding: &Holding) -> StoreResult<()>;

    /// Writes quantity/avg_cost/version/updated_at only if the stored version
    /// still equals `expected_version`.
    async fn update_holding(&self, holding: &Holding, expected_version: i64) -> StoreResult<bool>;

    async fn delete_holding(&self, id: ObjectId, expected_version: i64) -> StoreResult<bool>;

    async fn list_positions(&self, user_id: &str) -> StoreResult<Vec<Position>>;

    async fn insert_positions(&self, positions: &[Position]) -> StoreResult<()>;
}
