use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::models::{Holding, Order, OrderStatus, Position};

use super::{OrderFilter, Store, StoreError, StoreResult};

#[derive(Default)]
struct Collections {
    orders: Vec<Order>,
    holdings: Vec<Holding>,
    positions: Vec<Position>,
}

/// Process-local store with the same conditional-write semantics as Mongo.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_order(&self, order: &Order) -> StoreResult<()> {
        let mut c = self.lock();
        if c.orders.iter().any(|o| o.id == order.id) {
            return Err(StoreError::Conflict(format!("order {} already exists", order.id)));
        }
        c.orders.push(order.clone());
        Ok(())
    }

    async fn find_order(&self, id: ObjectId, user_id: &str) -> StoreResult<Option<Order>> {
        let c = self.lock();
        Ok(c
            .orders
            .iter()
            .find(|o| o.id == id && o.user_id == user_id)
            .cloned())
    }

    async fn list_orders(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>> {
        let c = self.lock();

        // later inserts first so equal timestamps still read newest first
        let mut out: Vec<Order> = c
            .orders
            .iter()
            .rev()
            .filter(|o| o.user_id == filter.user_id)
            .filter(|o| filter.status.is_none_or(|s| o.status == s))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        if let Some(limit) = filter.limit {
            out.truncate(usize::try_from(limit).unwrap_or(0));
        }
        Ok(out)
    }

    async fn cancel_pending_order(&self, id: ObjectId, cancelled_at: i64) -> StoreResult<bool> {
        let mut c = self.lock();
        match c
            .orders
            .iter_mut()
            .find(|o| o.id == id && o.status == OrderStatus::Pending)
        {
            Some(order) => {
                order.status = OrderStatus::Cancelled;
                order.cancelled_at = Some(cancelled_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_holding(&self, user_id: &str, symbol: &str) -> StoreResult<Option<Holding>> {
        let c = self.lock();
        Ok(c
            .holdings
            .iter()
            .find(|h| h.user_id == user_id && h.symbol == symbol)
            .cloned())
    }

    async fn list_holdings(&self, user_id: &str) -> StoreResult<Vec<Holding>> {
        let c = self.lock();
        let mut out: Vec<Holding> = c
            .holdings
            .iter()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(out)
    }

    async fn insert_holding(&self, holding: &Holding) -> StoreResult<()> {
        let mut c = self.lock();
        if c
            .holdings
            .iter()
            .any(|h| h.user_id == holding.user_id && h.symbol == holding.symbol)
        {
            return Err(StoreError::Conflict(format!(
                "holding {}/{} already exists",
                holding.user_id, holding.symbol
            )));
        }
        c.holdings.push(holding.clone());
        Ok(())
    }

    async fn update_holding(&self, holding: &Holding, expected_version: i64) -> StoreResult<bool> {
        let mut c = self.lock();
        match c
            .holdings
            .iter_mut()
            .find(|h| h.id == holding.id && h.version == expected_version)
        {
            Some(h) => {
                h.quantity = holding.quantity;
                h.avg_cost = holding.avg_cost;
                h.version = holding.version;
                h.updated_at = holding.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_holding(&self, id: ObjectId, expected_version: i64) -> StoreResult<bool> {
        let mut c = self.lock();
        let before = c.holdings.len();
        c.holdings.retain(|h| !(h.id == id && h.version == expected_version));
        Ok(c.holdings.len() < before)
    }

    async fn list_positions(&self, user_id: &str) -> StoreResult<Vec<Position>> {
        let c = self.lock();
        Ok(c
            .positions
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_positions(&self, positions: &[Position]) -> StoreResult<()> {
        let mut c = self.lock();
        c.positions.extend_from_slice(positions);
        Ok(())
    }
}
