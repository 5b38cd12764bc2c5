use shared::config::{AppConfig, StoreBackend};
use shared::{Config, DatabaseService};
use std::sync::Arc;
use tracing::info;

use crate::domains::invoices::{
    InvoiceService, InvoiceStore, MemoryInvoiceStore, PartyDirectory, PgInvoiceStore,
};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub invoice_service: InvoiceService,
    /// Present only when running against PostgreSQL.
    pub database: Option<DatabaseService>,
    pub store_backend: StoreBackend,
    pub app_config: AppConfig,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        match config.server.store_backend {
            StoreBackend::Postgres => {
                let database = DatabaseService::new(&config.database).await?;

                if config.database.run_migrations {
                    info!("Running database migrations");
                    sqlx::migrate!("./migrations").run(database.pool()).await?;
                }

                let store = Arc::new(PgInvoiceStore::new(database.pool().clone()));
                let mut state = Self::with_stores(
                    store.clone(),
                    store,
                    StoreBackend::Postgres,
                    config.app.clone(),
                );
                state.database = Some(database);
                Ok(state)
            }
            StoreBackend::Memory => {
                info!("Using in-memory invoice store");
                Ok(Self::in_memory(MemoryInvoiceStore::new(), config.app.clone()))
            }
        }
    }

    pub fn with_stores(
        store: Arc<dyn InvoiceStore>,
        directory: Arc<dyn PartyDirectory>,
        store_backend: StoreBackend,
        app_config: AppConfig,
    ) -> Self {
        Self {
            invoice_service: InvoiceService::new(store, directory),
            database: None,
            store_backend,
            app_config,
        }
    }

    pub fn in_memory(store: MemoryInvoiceStore, app_config: AppConfig) -> Self {
        let store = Arc::new(store);
        Self::with_stores(store.clone(), store, StoreBackend::Memory, app_config)
    }
}
