//! Applies a placed order to the user's aggregate holding.
//!
//! BUY folds the fill into a weighted-average cost basis, SELL decrements and
//! closes the holding at zero. A SELL that the holding cannot cover is not an
//! error: the holding is left alone and the outcome says why.
//!
//! Writes are version-checked and each (user, symbol) is settled by one task
//! at a time.

use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use tracing::debug;

use crate::{
    models::{Holding, OrderType},
    AppState,
};

use super::store::{Store, StoreError, StoreResult};

const MAX_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementOutcome {
    Created,
    Increased,
    Reduced,
    Closed,
    SkippedNoHolding,
    SkippedInsufficientQuantity,
    // MARKET / LIMIT orders carry no side
    Unchanged,
}

impl SettlementOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            SettlementOutcome::SkippedNoHolding | SettlementOutcome::SkippedInsufficientQuantity
        )
    }
}

#[derive(Debug, Clone)]
pub struct SettlementRequest<'a> {
    pub user_id: &'a str,
    pub symbol: &'a str,
    pub name: &'a str,
    pub quantity: i64,
    pub order_type: OrderType,
    pub price: f64,
}

pub fn lock_key(user_id: &str, symbol: &str) -> String {
    format!("{user_id}:{symbol}")
}

pub fn weighted_average(held_qty: i64, held_avg: f64, qty: i64, price: f64) -> f64 {
    let new_qty = held_qty as f64 + qty as f64;
    if new_qty == 0.0 {
        return 0.0;
    }
    ((held_qty as f64) * held_avg + (qty as f64) * price) / new_qty
}

pub async fn settle(
    state: &AppState,
    req: &SettlementRequest<'_>,
) -> StoreResult<SettlementOutcome> {
    if !matches!(req.order_type, OrderType::Buy | OrderType::Sell) {
        return Ok(SettlementOutcome::Unchanged);
    }

    let _guard = state
        .holding_locks
        .acquire(&lock_key(req.user_id, req.symbol))
        .await;

    for attempt in 1..=MAX_ATTEMPTS {
        match try_settle(state.store.as_ref(), req).await? {
            Some(outcome) => return Ok(outcome),
            None => debug!(
                attempt,
                user_id = req.user_id,
                symbol = req.symbol,
                "holding changed underneath settlement, retrying"
            ),
        }
    }

    Err(StoreError::Conflict(format!(
        "holding {}/{} kept changing during settlement",
        req.user_id, req.symbol
    )))
}

// None means a conditional write lost a race and the caller should re-read.
async fn try_settle(
    store: &dyn Store,
    req: &SettlementRequest<'_>,
) -> StoreResult<Option<SettlementOutcome>> {
    let existing = store.find_holding(req.user_id, req.symbol).await?;
    let now = Utc::now().timestamp_millis();

    match (req.order_type, existing) {
        (OrderType::Buy, Some(mut h)) => {
            let expected = h.version;
            let quantity = h.quantity.checked_add(req.quantity).ok_or_else(|| {
                StoreError::Rejected(format!(
                    "holding {}/{} quantity would overflow",
                    req.user_id, req.symbol
                ))
            })?;
            h.avg_cost = weighted_average(h.quantity, h.avg_cost, req.quantity, req.price);
            h.quantity = quantity;
            h.version += 1;
            h.updated_at = now;

            let written = store.update_holding(&h, expected).await?;
            Ok(written.then_some(SettlementOutcome::Increased))
        }
        (OrderType::Buy, None) => {
            let h = Holding {
                id: ObjectId::new(),
                user_id: req.user_id.to_string(),
                symbol: req.symbol.to_string(),
                name: req.name.to_string(),
                quantity: req.quantity,
                avg_cost: req.price,
                current_price: Some(req.price),
                version: 0,
                updated_at: now,
            };

            match store.insert_holding(&h).await {
                Ok(()) => Ok(Some(SettlementOutcome::Created)),
                // another writer opened it first; retry as an update
                Err(StoreError::Conflict(_)) => Ok(None),
                Err(e) => Err(e),
            }
        }
        (OrderType::Sell, None) => Ok(Some(SettlementOutcome::SkippedNoHolding)),
        (OrderType::Sell, Some(h)) if h.quantity < req.quantity => {
            Ok(Some(SettlementOutcome::SkippedInsufficientQuantity))
        }
        (OrderType::Sell, Some(mut h)) => {
            let expected = h.version;
            h.quantity -= req.quantity;

            if h.quantity == 0 {
                let deleted = store.delete_holding(h.id, expected).await?;
                return Ok(deleted.then_some(SettlementOutcome::Closed));
            }

            h.version += 1;
            h.updated_at = now;
            let written = store.update_holding(&h, expected).await?;
            Ok(written.then_some(SettlementOutcome::Reduced))
        }
        _ => Ok(Some(SettlementOutcome::Unchanged)),
    }
}
