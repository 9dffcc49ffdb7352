use async_trait::async_trait;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::FindOptions;
use mongodb::{Collection, Database};

use crate::models::{Holding, Order, OrderStatus, Position};

use super::{OrderFilter, Store, StoreError, StoreResult};

pub const ORDERS: &str = "orders";
pub const HOLDINGS: &str = "holdings";
pub const POSITIONS: &str = "positions";

const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn orders(&self) -> Collection<Order> {
        self.db.collection::<Order>(ORDERS)
    }

    fn holdings(&self) -> Collection<Holding> {
        self.db.collection::<Holding>(HOLDINGS)
    }

    fn positions(&self) -> Collection<Position> {
        self.db.collection::<Position>(POSITIONS)
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY
    )
}

// Holdings written before versioning was introduced have no `version` field.
fn versioned(id: ObjectId, expected_version: i64) -> Document {
    if expected_version == 0 {
        doc! {
            "_id": id,
            "$or": [ { "version": 0 }, { "version": { "$exists": false } } ],
        }
    } else {
        doc! { "_id": id, "version": expected_version }
    }
}

async fn collect<T>(mut cursor: mongodb::Cursor<T>) -> StoreResult<Vec<T>>
where
    T: serde::de::DeserializeOwned + Unpin + Send + Sync,
{
    let mut out: Vec<T> = vec![];
    while let Some(res) = cursor.next().await {
        out.push(res?);
    }
    Ok(out)
}

#[async_trait]
impl Store for MongoStore {
    async fn ping(&self) -> StoreResult<()> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    async fn insert_order(&self, order: &Order) -> StoreResult<()> {
        self.orders().insert_one(order, None).await?;
        Ok(())
    }

    async fn find_order(&self, id: ObjectId, user_id: &str) -> StoreResult<Option<Order>> {
        Ok(self
            .orders()
            .find_one(doc! { "_id": id, "userId": user_id }, None)
            .await?)
    }

    async fn list_orders(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>> {
        let mut query: Document = doc! { "userId": filter.user_id.as_str() };
        if let Some(status) = filter.status {
            query.insert("status", status.as_str());
        }

        let find_opts = FindOptions::builder()
            .sort(doc! { "timestamp": -1 })
            .limit(filter.limit)
            .build();

        let cursor = self.orders().find(query, find_opts).await?;
        collect(cursor).await
    }

    async fn cancel_pending_order(&self, id: ObjectId, cancelled_at: i64) -> StoreResult<bool> {
        let res = self
            .orders()
            .update_one(
                doc! { "_id": id, "status": OrderStatus::Pending.as_str() },
                doc! {
                    "$set": {
                        "status": OrderStatus::Cancelled.as_str(),
                        "cancelledAt": cancelled_at,
                    }
                },
                None,
            )
            .await?;
        Ok(res.modified_count == 1)
    }

    async fn find_holding(&self, user_id: &str, symbol: &str) -> StoreResult<Option<Holding>> {
        Ok(self
            .holdings()
            .find_one(doc! { "userId": user_id, "symbol": symbol }, None)
            .await?)
    }

    async fn list_holdings(&self, user_id: &str) -> StoreResult<Vec<Holding>> {
        let find_opts = FindOptions::builder().sort(doc! { "symbol": 1 }).build();
        let cursor = self
            .holdings()
            .find(doc! { "userId": user_id }, find_opts)
            .await?;
        collect(cursor).await
    }

    async fn insert_holding(&self, holding: &Holding) -> StoreResult<()> {
        match self.holdings().insert_one(holding, None).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::Conflict(format!(
                "holding {}/{} already exists",
                holding.user_id, holding.symbol
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_holding(&self, holding: &Holding, expected_version: i64) -> StoreResult<bool> {
        let res = self
            .holdings()
            .update_one(
                versioned(holding.id, expected_version),
                doc! {
                    "$set": {
                        "quantity": holding.quantity,
                        "avgCost": holding.avg_cost,
                        "version": holding.version,
                        "updatedAt": holding.updated_at,
                    }
                },
                None,
            )
            .await?;
        Ok(res.matched_count == 1)
    }

    async fn delete_holding(&self, id: ObjectId, expected_version: i64) -> StoreResult<bool> {
        let res = self
            .holdings()
            .delete_one(versioned(id, expected_version), None)
            .await?;
        Ok(res.deleted_count == 1)
    }

    async fn list_positions(&self, user_id: &str) -> StoreResult<Vec<Position>> {
        let cursor = self
            .positions()
            .find(doc! { "userId": user_id }, None)
            .await?;
        collect(cursor).await
    }

    async fn insert_positions(&self, positions: &[Position]) -> StoreResult<()> {
        if positions.is_empty() {
            return Ok(());
        }
        self.positions().insert_many(positions, None).await?;
        Ok(())
    }
}
