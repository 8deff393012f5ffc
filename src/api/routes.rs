//! API Routes
//!
//! Configures the Axum router with mirrored script routes and service endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers::{health_handler, script_handler, stats_handler, AppState};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET <route key>` - Mirrored script for each configured route
/// - `GET /stats` - Outcome counters
/// - `GET /health` - Health check endpoint
/// - anything else - Static assets from the configured directory
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler));

    let routes = state.routes.clone();
    for key in routes.keys() {
        router = router.route(key, get(script_handler));
    }

    router
        .fallback_service(ServeDir::new(&state.assets_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
