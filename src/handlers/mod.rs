//! HTTP handlers module
//!
//! Contains all HTTP endpoint handling logic

pub mod creatives;
pub mod health;

use std::sync::Arc;

use anyhow::Result;
use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::cache::MemoryCache;
use crate::clients::{ClientRegistry, TrialClient};
use crate::config::{ConfigStore, Settings};
use crate::resolver::ConfigResolver;

/// Application state
pub struct AppState {
    pub settings: Settings,
    pub resolver: ConfigResolver,
    pub registry: ClientRegistry,
    pub trials: TrialClient,
}

/// Create application router
pub async fn create_router(settings: Settings) -> Result<Router> {
    // One shared cache backend fronts both the resolver and the trial client
    let cache = Arc::new(MemoryCache::new());

    let store = ConfigStore::load(&settings)?;
    let resolver = ConfigResolver::new(store, cache.clone());
    let registry = ClientRegistry::with_default_clients();
    let trials = TrialClient::new(cache)?;

    let app_state = Arc::new(AppState {
        settings,
        resolver,
        registry,
        trials,
    });

    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let router = Router::new()
        .route(
            "/creatives/generate/:customer_id",
            get(creatives::generate_creatives),
        )
        .route("/health", get(health::health_check))
        .with_state(app_state)
        .layer(middleware_stack);

    Ok(router)
}
