use mongodb::{
    bson::{doc, oid::ObjectId},
    options::IndexOptions,
    Database, IndexModel,
};
use tracing::info;

use crate::models::Position;

use super::store::{
    mongo::{HOLDINGS, ORDERS, POSITIONS},
    Store, StoreResult,
};

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // holdings: one aggregate per (userId, symbol)
    {
        let col = db.collection::<mongodb::bson::Document>(HOLDINGS);
        let model = IndexModel::builder()
            .keys(doc! { "userId": 1, "symbol": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None).await?;
    }

    // orders: listed per user, newest first
    {
        let col = db.collection::<mongodb::bson::Document>(ORDERS);
        let model = IndexModel::builder()
            .keys(doc! { "userId": 1, "timestamp": -1 })
            .build();

        col.create_index(model, None).await?;
    }

    {
        let col = db.collection::<mongodb::bson::Document>(POSITIONS);
        let model = IndexModel::builder().keys(doc! { "userId": 1 }).build();

        col.create_index(model, None).await?;
    }

    Ok(())
}

pub fn demo_positions(user_id: &str) -> Vec<Position> {
    vec![
        Position {
            id: ObjectId::new(),
            user_id: user_id.to_string(),
            product: "CNC".into(),
            symbol: "EVEREADY".into(),
            name: "EVEREADY".into(),
            quantity: 2,
            avg: 316.27,
            price: 312.35,
            net: Some("+0.58%".into()),
            day: Some("-1.24%".into()),
            is_loss: true,
        },
        Position {
            id: ObjectId::new(),
            user_id: user_id.to_string(),
            product: "CNC".into(),
            symbol: "JUBLFOOD".into(),
            name: "JUBLFOOD".into(),
            quantity: 1,
            avg: 3124.75,
            price: 3082.65,
            net: Some("+10.04%".into()),
            day: Some("-1.35%".into()),
            is_loss: true,
        },
    ]
}

/// Inserts the demo positions once; returns how many were written.
pub async fn seed_demo_positions(store: &dyn Store, user_id: &str) -> StoreResult<usize> {
    if !store.list_positions(user_id).await?.is_empty() {
        return Ok(0);
    }

    let positions = demo_positions(user_id);
    store.insert_positions(&positions).await?;
    info!(user_id, count = positions.len(), "seeded demo positions");
    Ok(positions.len())
}
