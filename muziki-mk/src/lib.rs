//! muziki-mk library - Marketplace service
//!
//! Purchase recording, stream event recording and analytics aggregation
//! for the Muziki music marketplace. Page rendering, uploads and playlist
//! management live elsewhere; this service owns the money and the numbers.

use axum::routing::{get, post};
use axum::{middleware, Router};
use muziki_common::config::ServiceConfig;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod analytics;
pub mod api;
pub mod db;
pub mod purchase;
pub mod streams;

use purchase::settlement::SettlementGateway;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<ServiceConfig>,
    /// Secret the identity verifier signs credentials with
    pub token_secret: Arc<String>,
    pub gateway: Arc<dyn SettlementGateway>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        config: ServiceConfig,
        token_secret: String,
        gateway: Arc<dyn SettlementGateway>,
    ) -> Self {
        Self {
            db,
            config: Arc::new(config),
            token_secret: Arc::new(token_secret),
            gateway,
        }
    }
}

/// Build application router
///
/// Payment and artist-analytics routes sit behind the bearer-token
/// middleware; stream routes handle credentials themselves because
/// anonymous plays are allowed.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/api/payments",
            post(api::record_payment).get(api::payment_history),
        )
        .route("/api/artist/analytics", get(api::artist_analytics))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    let public = Router::new()
        .route(
            "/api/streams",
            post(api::record_stream).get(api::stream_analytics),
        )
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
