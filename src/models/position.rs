use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub user_id: String,
    pub product: String,
    pub symbol: String,
    pub name: String,

    pub quantity: i64,
    pub avg: f64,
    pub price: f64,

    #[serde(default)]
    pub net: Option<String>,
    #[serde(default)]
    pub day: Option<String>,
    #[serde(default)]
    pub is_loss: bool,
}
