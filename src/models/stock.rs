use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stock {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    // percent change on the day
    pub change: f64,
    pub sector: String,
}
