//! # Sectorplan DB
//!
//! Adapters for the [`BookingStore`](sectorplan_core::store::BookingStore) port:
//!
//! - [`PgBookingStore`]: PostgreSQL through sqlx, built on the query functions
//!   in [`repositories`] and the tables from [`schema`]
//! - [`MemoryBookingStore`]: an in-process store for development and tests
//!
//! [`mock`] provides a mockall double of the port for failure injection.

pub mod memory;
pub mod mock;
pub mod models;
pub mod postgres;
pub mod repositories;
pub mod schema;

pub use memory::MemoryBookingStore;
pub use postgres::PgBookingStore;

use eyre::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

pub type DbPool = Pool<Postgres>;

pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}
