//! Library entrypoint for TradeDesk.
//!
//! Integration tests under `tests/` build an `AppState` on the in-memory
//! store and drive `routes::app` directly.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;

pub mod services;

pub mod controllers;
pub mod routes;

use services::{
    catalog::{PriceLookup, StaticCatalog},
    key_lock::KeyedLocks,
    store::{MemoryStore, Store},
};

#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub store: Arc<dyn Store>,
    pub catalog: Arc<dyn PriceLookup>,
    pub holding_locks: KeyedLocks,
}

impl AppState {
    pub fn new(
        settings: config::Settings,
        store: Arc<dyn Store>,
        catalog: Arc<dyn PriceLookup>,
    ) -> Self {
        Self {
            settings,
            store,
            catalog,
            holding_locks: KeyedLocks::new(),
        }
    }

    /// In-memory store plus the sample NSE catalog.
    pub fn in_memory(settings: config::Settings) -> Self {
        Self::new(
            settings,
            Arc::new(MemoryStore::new()),
            Arc::new(StaticCatalog::nse_sample()),
        )
    }
}
