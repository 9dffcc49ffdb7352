use crate::models::Stock;

/// Read-only access to instrument prices.
pub trait PriceLookup: Send + Sync {
    fn get(&self, symbol: &str) -> Option<Stock>;

    /// Case-insensitive search, in catalog order, capped at `limit`.
    fn search(&self, query: &str, limit: usize) -> Vec<Stock>;

    fn price_of(&self, symbol: &str) -> Option<f64> {
        self.get(symbol).map(|s| s.price)
    }
}

/// The fixed NSE price table the simulator trades against.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    stocks: Vec<Stock>,
}

const NSE_SAMPLE: &[(&str, &str, f64, f64, &str)] = &[
    ("RELIANCE", "Reliance Industries Ltd", 2456.30, 2.5, "ENERGY"),
    ("TCS", "Tata Consultancy Services", 3421.50, -0.8, "IT"),
    ("HDFCBANK", "HDFC Bank Ltd", 1456.70, 1.2, "BANKING"),
    ("INFY", "Infosys Ltd", 1432.80, -1.5, "IT"),
    ("ITC", "ITC Ltd", 432.15, 0.9, "CONSUMER GOODS"),
    ("SBIN", "State Bank of India", 523.40, 2.1, "BANKING"),
    ("BHARTIARTL", "Bharti Airtel Ltd", 938.50, -0.3, "TELECOM"),
    ("HINDUNILVR", "Hindustan Unilever Ltd", 2417.40, 0.7, "CONSUMER GOODS"),
    ("KPITTECH", "KPIT Technologies Ltd", 266.45, 1.8, "IT"),
    ("M&M", "Mahindra & Mahindra Ltd", 779.80, -0.5, "AUTOMOBILE"),
];

impl StaticCatalog {
    pub fn new(stocks: Vec<Stock>) -> Self {
        Self { stocks }
    }

    pub fn nse_sample() -> Self {
        let stocks = NSE_SAMPLE
            .iter()
            .map(|(symbol, name, price, change, sector)| Stock {
                symbol: symbol.to_string(),
                name: name.to_string(),
                price: *price,
                change: *change,
                sector: sector.to_string(),
            })
            .collect();
        Self::new(stocks)
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::nse_sample()
    }
}

// Symbols match on their prefix, names on the start of any word, so "tc"
// finds TCS but not ITC.
fn is_match(stock: &Stock, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    let symbol = stock.symbol.to_lowercase();
    let name = stock.name.to_lowercase();

    symbol.starts_with(needle) || name.starts_with(needle) || name.contains(&format!(" {needle}"))
}

impl PriceLookup for StaticCatalog {
    fn get(&self, symbol: &str) -> Option<Stock> {
        let sym = symbol.trim().to_uppercase();
        self.stocks.iter().find(|s| s.symbol == sym).cloned()
    }

    fn search(&self, query: &str, limit: usize) -> Vec<Stock> {
        let needle = query.trim().to_lowercase();
        self.stocks
            .iter()
            .filter(|s| is_match(s, &needle))
            .take(limit)
            .cloned()
            .collect()
    }
}
