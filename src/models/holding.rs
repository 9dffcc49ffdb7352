use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub user_id: String,
    pub symbol: String,
    pub name: String,

    pub quantity: i64,
    pub avg_cost: f64,

    // price at the time the holding was opened
    #[serde(default)]
    pub current_price: Option<f64>,

    // bumped on every write; conditional updates match on it
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Holding {
    pub fn investment(&self) -> f64 {
        self.avg_cost * (self.quantity as f64)
    }
}
