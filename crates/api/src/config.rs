//! # API Configuration Module
//!
//! Loads the server settings from environment variables, with defaults where
//! a sensible one exists.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: address to bind to (default: "0.0.0.0")
//! - `API_PORT`: port to listen on (default: 3000)
//! - `STORE_BACKEND`: `postgres` or `memory` (default: `postgres`)
//! - `DATABASE_URL`: PostgreSQL connection string (required for `postgres`)
//! - `LOG_LEVEL`: logging level (default: "info")
//! - `API_CORS_ORIGINS`: comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: whole-request timeout (default: 30)
//! - `LEDGER_STORE_TIMEOUT_MS`: bound on each store round-trip (default: 5000)
//! - `TEACHER_IDENTITY_HEADER`: header carrying the signed-in teacher
//!   (default: `x-teacher-identity`)
//! - `SCHOOL_TIMEZONE`: zone slot times are expressed in (default: `Europe/Amsterdam`)
//! - `CALENDAR_LOCATION`: location written into calendar exports (default: "School")

use std::{env, fmt, str::FromStr, time::Duration};

use axum::http::HeaderName;
use chrono_tz::Tz;
use eyre::{Result, WrapErr, eyre};
use sectorplan_core::calendar::CalendarSettings;
use sectorplan_core::ledger::DEFAULT_STORE_TIMEOUT;
use tracing::Level;

pub const DEFAULT_IDENTITY_HEADER: &str = "x-teacher-identity";

/// Which [`BookingStore`](sectorplan_core::store::BookingStore) adapter the
/// server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(eyre!("Unknown STORE_BACKEND '{other}', expected 'postgres' or 'memory'")),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Postgres => "postgres",
            Self::Memory => "memory",
        })
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    pub port: u16,

    pub store_backend: StoreBackend,

    /// PostgreSQL connection string; always present for [`StoreBackend::Postgres`]
    pub database_url: Option<String>,

    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    pub store_timeout: Duration,

    pub identity_header: HeaderName,

    pub timezone: Tz,

    pub calendar_location: String,
}

impl ApiConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// - `DATABASE_URL` is missing while the postgres backend is selected
    /// - a numeric value, the backend, the header name or the timezone cannot
    ///   be parsed
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so tests need not touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // Network settings
        let host = var("API_HOST", "0.0.0.0");
        let port = var("API_PORT", "3000")
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Store settings
        let store_backend: StoreBackend = var("STORE_BACKEND", "postgres").parse()?;
        let database_url = lookup("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(eyre!(
                "DATABASE_URL environment variable must be set for the postgres backend"
            ));
        }
        let store_timeout = match lookup("LEDGER_STORE_TIMEOUT_MS") {
            Some(ms) => Duration::from_millis(
                ms.parse()
                    .wrap_err("Invalid LEDGER_STORE_TIMEOUT_MS value")?,
            ),
            None => DEFAULT_STORE_TIMEOUT,
        };

        // Logging settings
        let log_level = match var("LOG_LEVEL", "info").to_ascii_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // CORS settings
        let cors_origins = lookup("API_CORS_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        let request_timeout = var("API_REQUEST_TIMEOUT_SECONDS", "30")
            .parse()
            .unwrap_or(30);

        // Teacher gate
        let identity_header = HeaderName::from_str(
            &var("TEACHER_IDENTITY_HEADER", DEFAULT_IDENTITY_HEADER).to_ascii_lowercase(),
        )
        .wrap_err("Invalid TEACHER_IDENTITY_HEADER value")?;

        // Calendar export
        let timezone = var("SCHOOL_TIMEZONE", "Europe/Amsterdam")
            .parse::<Tz>()
            .map_err(|e| eyre!("Invalid SCHOOL_TIMEZONE value: {e}"))?;
        let calendar_location = var("CALENDAR_LOCATION", "School");

        Ok(Self {
            host,
            port,
            store_backend,
            database_url,
            log_level,
            cors_origins,
            request_timeout,
            store_timeout,
            identity_header,
            timezone,
            calendar_location,
        })
    }

    /// Returns the server address, e.g. "127.0.0.1:8080"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn calendar_settings(&self) -> CalendarSettings {
        CalendarSettings {
            timezone: self.timezone,
            location: self.calendar_location.clone(),
            ..CalendarSettings::default()
        }
    }
}
