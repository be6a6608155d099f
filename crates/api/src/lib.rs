//! # Sectorplan API
//!
//! HTTP boundary of the sector-project presentation planner. Students list
//! open slots of a teacher and book one; teachers open and close times, follow
//! up on appointments and delete unused slots.
//!
//! ## Architecture
//!
//! - **Routes**: URL structure, one module per resource
//! - **Handlers**: parse input, call the [`BookingLedger`], wrap the result in
//!   the [`response::ApiResponse`] envelope
//! - **Middleware**: the teacher gate and the error-to-status mapping
//! - **Config**: environment configuration
//!
//! All booking rules live in `sectorplan-core`; this crate never talks to a
//! store directly.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Teacher gate and error mapping
pub mod middleware;
/// JSON envelope shared by all handlers
pub mod response;
/// Route definitions and API endpoint structure
pub mod routes;

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    error_handling::HandleErrorLayer,
    http::{HeaderName, HeaderValue, Method, header},
};
use eyre::Result;
use sectorplan_core::{calendar::CalendarSettings, ledger::BookingLedger};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    pub ledger: BookingLedger,
    pub calendar: CalendarSettings,
    /// Header the identity provider puts the signed-in teacher in.
    pub identity_header: HeaderName,
}

impl ApiState {
    pub fn new(ledger: BookingLedger) -> Self {
        Self {
            ledger,
            calendar: CalendarSettings::default(),
            identity_header: HeaderName::from_static(config::DEFAULT_IDENTITY_HEADER),
        }
    }
}

/// All routes with the shared state attached, without transport layers.
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Student booking, calendar export and teacher slot management
        .merge(routes::slots::routes())
        // Teacher appointment follow-up
        .merge(routes::appointments::routes())
        .with_state(state)
}

/// Bounds every request by `timeout`; an elapsed request is answered with the
/// JSON envelope and a 504.
pub fn with_request_timeout(router: Router, timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(
                middleware::error_handling::handle_layer_error,
            ))
            .timeout(timeout),
    )
}

/// Installs the global tracing subscriber at `level`.
pub fn init_tracing(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn cors_layer(origins: &[String], identity_header: &HeaderName) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            identity_header.clone(),
        ])
        .allow_origin(origins)
        .allow_credentials(true)
}

/// Serves the API on the configured address until the process stops.
///
/// Tracing must already be initialised (see [`init_tracing`]).
pub async fn start_server(config: config::ApiConfig, ledger: BookingLedger) -> Result<()> {
    let state = Arc::new(ApiState {
        ledger,
        calendar: config.calendar_settings(),
        identity_header: config.identity_header.clone(),
    });

    let app = build_router(state);

    // Apply CORS configuration if origins are specified
    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins, &config.identity_header)),
        None => app,
    };

    let app = with_request_timeout(app, Duration::from_secs(config.request_timeout));
    let app = app.layer(TraceLayer::new_for_http());

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(backend = %config.store_backend, "Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
