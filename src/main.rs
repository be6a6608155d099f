use std::sync::Arc;

use color_eyre::eyre::{Result, eyre};
use dotenv::dotenv;
use sectorplan_api::config::{ApiConfig, StoreBackend};
use sectorplan_core::{ledger::BookingLedger, store::BookingStore};
use sectorplan_db::{MemoryBookingStore, PgBookingStore, create_pool, schema::initialize_database};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;
    sectorplan_api::init_tracing(config.log_level)?;

    let store: Arc<dyn BookingStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| eyre!("DATABASE_URL must be set for the postgres backend"))?;
            let db_pool = create_pool(database_url).await?;
            initialize_database(&db_pool).await?;
            Arc::new(PgBookingStore::new(db_pool))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; bookings are lost on restart");
            Arc::new(MemoryBookingStore::new())
        }
    };

    let ledger = BookingLedger::new(store).with_timeout(config.store_timeout);
    info!(store_timeout = ?ledger.timeout(), "Booking ledger ready");

    // Start API server
    sectorplan_api::start_server(config, ledger).await?;

    Ok(())
}
