use std::net::SocketAddr;
use std::sync::Arc;

use mongodb::Client;

use tradedesk::{
    config::{self, StoreBackend},
    routes,
    services::{
        catalog::StaticCatalog,
        db_init,
        store::{MemoryStore, MongoStore, Store},
    },
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    let store: Arc<dyn Store> = match settings.store_backend {
        StoreBackend::Mongo => {
            let client = Client::with_uri_str(&settings.mongodb_uri).await?;
            let db = client.database(&settings.mongodb_db);

            if let Err(e) = db_init::ensure_indexes(&db).await {
                tracing::warn!(error = %e, "could not create indexes");
            }

            tracing::info!(db = %settings.mongodb_db, "using mongodb store");
            Arc::new(MongoStore::new(db))
        }
        StoreBackend::Memory => {
            tracing::info!("using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    if settings.seed_demo_data {
        db_init::seed_demo_positions(store.as_ref(), &settings.default_user_id).await?;
    }

    let state = AppState::new(settings.clone(), store, Arc::new(StaticCatalog::nse_sample()));
    let app = routes::app(state);

    let addr = SocketAddr::from((settings.host.parse::<std::net::IpAddr>()?, settings.port));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
