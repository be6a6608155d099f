use std::{collections::HashMap, time::Duration};

use pretty_assertions::assert_eq;
use sectorplan_api::config::{ApiConfig, StoreBackend};
use tracing::Level;

fn config_from(pairs: &[(&str, &str)]) -> eyre::Result<ApiConfig> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ApiConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn test_defaults_with_database_url() {
    let config = config_from(&[("DATABASE_URL", "postgres://localhost/sectorplan")]).unwrap();

    assert_eq!(config.server_addr(), "0.0.0.0:3000");
    assert_eq!(config.store_backend, StoreBackend::Postgres);
    assert_eq!(config.log_level, Level::INFO);
    assert_eq!(config.request_timeout, 30);
    assert_eq!(config.store_timeout, Duration::from_millis(5000));
    assert_eq!(config.identity_header.as_str(), "x-teacher-identity");
    assert_eq!(config.timezone, chrono_tz::Europe::Amsterdam);
    assert_eq!(config.calendar_settings().location, "School");
    assert_eq!(config.cors_origins, None);
}

#[test]
fn test_postgres_backend_requires_database_url() {
    let err = config_from(&[]).unwrap_err();

    assert!(err.to_string().contains("DATABASE_URL"), "{err}");
}

#[test]
fn test_memory_backend_needs_no_database() {
    let config = config_from(&[
        ("STORE_BACKEND", "Memory"),
        ("API_PORT", "8080"),
        ("LOG_LEVEL", "DEBUG"),
        ("LEDGER_STORE_TIMEOUT_MS", "250"),
        ("TEACHER_IDENTITY_HEADER", "X-Forwarded-User"),
        ("SCHOOL_TIMEZONE", "Europe/Brussels"),
        ("CALENDAR_LOCATION", "Aula"),
        ("API_CORS_ORIGINS", "http://localhost:5173, https://planning.example.nl,"),
    ])
    .unwrap();

    assert_eq!(config.store_backend, StoreBackend::Memory);
    assert_eq!(config.database_url, None);
    assert_eq!(config.port, 8080);
    assert_eq!(config.log_level, Level::DEBUG);
    assert_eq!(config.store_timeout, Duration::from_millis(250));
    assert_eq!(config.identity_header.as_str(), "x-forwarded-user");
    assert_eq!(config.calendar_settings().timezone, chrono_tz::Europe::Brussels);
    assert_eq!(config.calendar_settings().location, "Aula");
    assert_eq!(
        config.cors_origins,
        Some(vec![
            "http://localhost:5173".to_string(),
            "https://planning.example.nl".to_string()
        ])
    );
}

#[test]
fn test_invalid_values_are_rejected() {
    assert!(config_from(&[("STORE_BACKEND", "sqlite")]).is_err());
    assert!(config_from(&[("STORE_BACKEND", "memory"), ("API_PORT", "http")]).is_err());
    assert!(
        config_from(&[("STORE_BACKEND", "memory"), ("SCHOOL_TIMEZONE", "Mars/Olympus")]).is_err()
    );
    assert!(
        config_from(&[("STORE_BACKEND", "memory"), ("LEDGER_STORE_TIMEOUT_MS", "soon")]).is_err()
    );
}
