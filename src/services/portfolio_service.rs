use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;

use crate::{
    models::{Holding, Order, OrderStatus, Position},
    AppState,
};

use super::{
    catalog::PriceLookup,
    store::{OrderFilter, StoreResult},
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingView {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub quantity: i64,
    pub avg_cost: f64,
    pub current_price: f64,
    pub value: f64,
    pub pnl: f64,
    pub pnl_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionView {
    pub id: String,
    pub product: String,
    pub symbol: String,
    pub name: String,
    pub quantity: i64,
    pub avg: f64,
    pub price: f64,
    pub net: Option<String>,
    pub day: Option<String>,
    pub is_loss: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_investment: f64,
    pub current_value: f64,
    #[serde(rename = "totalPnL")]
    pub total_pnl: f64,
    #[serde(rename = "totalPnLPercent")]
    pub total_pnl_percent: f64,
    pub total_holdings: usize,
    pub today_orders: usize,
    pub total_orders: usize,
}

fn pct(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

// Symbols that dropped out of the catalog are valued at cost.
fn mark_price(h: &Holding, catalog: &dyn PriceLookup) -> f64 {
    catalog.price_of(&h.symbol).unwrap_or(h.avg_cost)
}

pub fn holding_view(h: &Holding, catalog: &dyn PriceLookup) -> HoldingView {
    let current_price = mark_price(h, catalog);
    let qty = h.quantity as f64;
    let pnl = qty * (current_price - h.avg_cost);

    HoldingView {
        id: h.id.to_hex(),
        symbol: h.symbol.clone(),
        name: h.name.clone(),
        quantity: h.quantity,
        avg_cost: h.avg_cost,
        current_price,
        value: qty * current_price,
        pnl,
        pnl_percent: pct(pnl, h.investment()),
    }
}

pub fn position_view(p: &Position) -> PositionView {
    PositionView {
        id: p.id.to_hex(),
        product: p.product.clone(),
        symbol: p.symbol.clone(),
        name: p.name.clone(),
        quantity: p.quantity,
        avg: p.avg,
        price: p.price,
        net: p.net.clone(),
        day: p.day.clone(),
        is_loss: p.is_loss,
    }
}

fn local_date(ts_millis: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(ts_millis).map(|d| d.with_timezone(&Local).date_naive())
}

/// Aggregates holdings at catalog prices; `completed` are the user's COMPLETE orders.
pub fn summarize(
    holdings: &[Holding],
    completed: &[Order],
    catalog: &dyn PriceLookup,
    today: NaiveDate,
) -> PortfolioSummary {
    let mut total_investment = 0.0;
    let mut current_value = 0.0;

    for h in holdings {
        total_investment += h.investment();
        current_value += (h.quantity as f64) * mark_price(h, catalog);
    }

    let total_pnl = current_value - total_investment;

    let today_orders = completed
        .iter()
        .filter(|o| local_date(o.timestamp) == Some(today))
        .count();

    PortfolioSummary {
        total_investment,
        current_value,
        total_pnl,
        total_pnl_percent: pct(total_pnl, total_investment),
        total_holdings: holdings.len(),
        today_orders,
        total_orders: completed.len(),
    }
}

pub async fn list_holding_views(state: &AppState, user_id: &str) -> StoreResult<Vec<HoldingView>> {
    let holdings = state.store.list_holdings(user_id).await?;
    Ok(holdings
        .iter()
        .map(|h| holding_view(h, state.catalog.as_ref()))
        .collect())
}

pub async fn list_position_views(
    state: &AppState,
    user_id: &str,
) -> StoreResult<Vec<PositionView>> {
    let positions = state.store.list_positions(user_id).await?;
    Ok(positions.iter().map(position_view).collect())
}

pub async fn portfolio_summary(
    state: &AppState,
    user_id: &str,
    today: NaiveDate,
) -> StoreResult<PortfolioSummary> {
    let holdings = state.store.list_holdings(user_id).await?;
    let completed = state
        .store
        .list_orders(&OrderFilter {
            user_id: user_id.to_string(),
            status: Some(OrderStatus::Complete),
            limit: None,
        })
        .await?;

    Ok(summarize(&holdings, &completed, state.catalog.as_ref(), today))
}

#[cfg(test)]
mod tests {
    use mongodb::bson::oid::ObjectId;

    use crate::{
        models::{Charges, OrderType},
        services::catalog::StaticCatalog,
    };

    use super::*;

    fn holding(symbol: &str, quantity: i64, avg_cost: f64) -> Holding {
        Holding {
            id: ObjectId::new(),
            user_id: "demo_user".into(),
            symbol: symbol.into(),
            name: symbol.into(),
            quantity,
            avg_cost,
            current_price: None,
            version: 0,
            updated_at: 0,
        }
    }

    fn completed_at(ts: i64) -> Order {
        Order {
            id: ObjectId::new(),
            user_id: "demo_user".into(),
            symbol: "TCS".into(),
            name: "Tata Consultancy Services".into(),
            quantity: 1,
            price: 3421.5,
            order_type: OrderType::Buy,
            product_type: "INTRADAY".into(),
            validity: "DAY".into(),
            variety: "NORMAL".into(),
            status: OrderStatus::Complete,
            order_value: 3421.5,
            charges: Charges {
                brokerage: "1.03".into(),
                stt: "3.42".into(),
                transaction_charges: "0.10".into(),
                gst: "0.20".into(),
                total: "4.75".into(),
            },
            exchange: "NSE".into(),
            segment: "EQUITY".into(),
            timestamp: ts,
            cancelled_at: None,
        }
    }

    #[test]
    fn holding_view_marks_to_catalog() {
        let cat = StaticCatalog::nse_sample();
        let v = holding_view(&holding("INFY", 10, 1400.0), &cat);
        assert_eq!(v.current_price, 1432.80);
        assert!((v.value - 14328.0).abs() < 1e-6);
        assert!((v.pnl - 328.0).abs() < 1e-6);
        assert!((v.pnl_percent - 328.0 / 14000.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_symbol_is_valued_at_cost() {
        let cat = StaticCatalog::nse_sample();
        let v = holding_view(&holding("EVEREADY", 2, 316.27), &cat);
        assert_eq!(v.current_price, 316.27);
        assert_eq!(v.pnl, 0.0);
        assert_eq!(v.pnl_percent, 0.0);
    }

    #[test]
    fn zero_cost_basis_does_not_divide_by_zero() {
        let cat = StaticCatalog::nse_sample();
        let v = holding_view(&holding("ITC", 5, 0.0), &cat);
        assert_eq!(v.pnl_percent, 0.0);
        assert!(v.pnl > 0.0);
    }

    #[test]
    fn summary_counts_todays_completed_orders() {
        let cat = StaticCatalog::nse_sample();
        let now = 1_760_000_000_000_i64;
        let today = local_date(now).unwrap();
        let three_days_ago = now - 3 * 24 * 60 * 60 * 1000;

        let holdings = vec![holding("INFY", 10, 1400.0), holding("TCS", 1, 3421.5)];
        let orders = vec![completed_at(now), completed_at(three_days_ago)];

        let s = summarize(&holdings, &orders, &cat, today);
        assert!((s.total_investment - 17421.5).abs() < 1e-6);
        assert!((s.current_value - 17749.5).abs() < 1e-6);
        assert!((s.total_pnl - 328.0).abs() < 1e-6);
        assert_eq!(s.total_holdings, 2);
        assert_eq!(s.today_orders, 1);
        assert_eq!(s.total_orders, 2);
    }

    #[test]
    fn empty_portfolio_is_all_zero() {
        let cat = StaticCatalog::nse_sample();
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(summarize(&[], &[], &cat, today), PortfolioSummary::default());
    }
}
