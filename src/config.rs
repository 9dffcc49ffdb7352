use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub host: String,
    pub port: u16,

    pub store_backend: StoreBackend,
    pub default_user_id: String,
    pub seed_demo_data: bool,
    pub orders_default_limit: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            mongodb_db: "tradedesk".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3002,
            store_backend: StoreBackend::Mongo,
            default_user_id: "demo_user".to_string(),
            seed_demo_data: false,
            orders_default_limit: 50,
        }
    }
}

fn parse_bool(s: &str) -> bool {
    matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let defaults = Settings::default();

    let mongodb_uri = env::var("MONGODB_URI").unwrap_or(defaults.mongodb_uri);
    let mongodb_db = env::var("MONGODB_DB").unwrap_or(defaults.mongodb_db);
    let host = env::var("HOST").unwrap_or(defaults.host);

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(defaults.port);

    let store_backend = match env::var("STORE_BACKEND") {
        Ok(v) if v.trim().eq_ignore_ascii_case("memory") => StoreBackend::Memory,
        _ => StoreBackend::Mongo,
    };

    let default_user_id = env::var("DEFAULT_USER_ID")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(defaults.default_user_id);

    let seed_demo_data = env::var("SEED_DEMO_DATA")
        .map(|s| parse_bool(&s))
        .unwrap_or(defaults.seed_demo_data);

    let orders_default_limit = env::var("ORDERS_DEFAULT_LIMIT")
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(defaults.orders_default_limit);

    Settings {
        mongodb_uri,
        mongodb_db,
        host,
        port,
        store_backend,
        default_user_id,
        seed_demo_data,
        orders_default_limit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert!(parse_bool("true"));
        assert!(parse_bool(" YES "));
        assert!(parse_bool("1"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
    }
}
