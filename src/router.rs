//! HTTP router.
//!
//! Defines the axum router with all service endpoints.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handler::{health_check, list_templates, run_report, save_template};
use crate::server::AppState;

/// Create the main router for the service.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Tracing layer for request logging
    let trace = TraceLayer::new_for_http();

    let mut router = Router::new()
        // Health check
        .route("/health", get(health_check))
        // Report endpoints
        .route("/api/reports/run", post(run_report))
        .route(
            "/api/reports/templates",
            get(list_templates).post(save_template),
        )
        .layer(trace);

    if state.config.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router = router.layer(cors);
    }

    router.with_state(state)
}
