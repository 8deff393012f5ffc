//! API Handlers
//!
//! HTTP request handlers for mirrored scripts and service endpoints.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use crate::api::assembler::{assemble, failure};
use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::Result;
use crate::mirror::Orchestrator;
use crate::models::{HealthResponse, StatsResponse};
use crate::origin::{HttpFetcher, OriginFetcher};
use crate::routes::RouteTable;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub routes: Arc<RouteTable>,
    /// Support channel referenced in 502 bodies
    pub support_url: Arc<str>,
    /// Directory served for requests matching no route
    pub assets_dir: PathBuf,
}

impl AppState {
    /// Creates a new AppState from its parts.
    pub fn new(
        orchestrator: Orchestrator,
        routes: RouteTable,
        support_url: impl Into<Arc<str>>,
        assets_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            routes: Arc::new(routes),
            support_url: support_url.into(),
            assets_dir: assets_dir.into(),
        }
    }

    /// Creates a new AppState from configuration, fetching over HTTP and
    /// caching in `store`.
    ///
    /// Fails if `config` does not pass [`Config::validate`].
    pub fn from_config(
        config: &Config,
        routes: RouteTable,
        store: Arc<dyn CacheStore>,
    ) -> Result<Self> {
        config.validate()?;
        let fetcher: Arc<dyn OriginFetcher> = Arc::new(HttpFetcher::new());
        let orchestrator = Orchestrator::new(
            store,
            fetcher,
            config.freshness_policy(),
            config.upstream_base.clone(),
            config.fetch_timeout(),
        );
        Ok(Self::new(
            orchestrator,
            routes,
            config.support_url.as_str(),
            config.assets_dir.clone(),
        ))
    }
}

/// Handler for `GET <route key>`
///
/// Serves the mirrored script, stale fallback, or a 502.
pub async fn script_handler(State(state): State<AppState>, uri: Uri) -> Response {
    // One snapshot of "now" per request.
    let now = Utc::now();

    let Some(route) = state.routes.lookup(uri.path()) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match state.orchestrator.serve(route, now).await {
        Ok(served) => assemble(route, served),
        Err(err) => failure(&err, &state.support_url),
    }
}

/// Handler for GET /stats
///
/// Returns how script responses have been produced since startup.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.orchestrator.stats();
    Json(StatsResponse::new(stats, state.routes.len()))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{FreshnessPolicy, MemoryStore};
    use crate::origin::FetchOutcome;
    use crate::routes::RouteDescriptor;
    use async_trait::async_trait;
    use std::time::Duration;

    struct TimingOut;

    #[async_trait]
    impl OriginFetcher for TimingOut {
        async fn fetch(&self, _locator: &str, _timeout: Duration) -> FetchOutcome {
            FetchOutcome::TimedOut
        }
    }

    fn state() -> AppState {
        let routes = RouteTable::new(vec![RouteDescriptor {
            key: "/deck".to_string(),
            upstream_path: "/targets/deck.sh".to_string(),
            label: "Steam Deck (SteamOS)".to_string(),
            expected_digest: "0".repeat(64),
        }])
        .unwrap();
        let orchestrator = Orchestrator::new(
            Arc::new(MemoryStore::new()),
            Arc::new(TimingOut),
            FreshnessPolicy::default(),
            "https://origin.test",
            Duration::from_millis(50),
        );
        AppState::new(orchestrator, routes, "https://support.test", "public")
    }

    #[test]
    fn test_from_config_rejects_inverted_ttls() {
        let config = Config {
            fresh_ttl: 600,
            stale_ttl: 60,
            ..Config::default()
        };

        let result = AppState::from_config(
            &config,
            RouteTable::default(),
            Arc::new(MemoryStore::new()),
        );
        assert!(matches!(result, Err(crate::error::MirrorError::Config(_))));
    }

    #[test]
    fn test_from_config_accepts_defaults() {
        let result = AppState::from_config(
            &Config::default(),
            RouteTable::default(),
            Arc::new(MemoryStore::new()),
        );
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_script_handler_total_failure() {
        let response = script_handler(State(state()), Uri::from_static("/deck")).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_script_handler_unknown_route() {
        let response = script_handler(State(state()), Uri::from_static("/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = state();
        let _ = script_handler(State(state.clone()), Uri::from_static("/deck")).await;

        let response = stats_handler(State(state)).await;
        assert_eq!(response.failures, 1);
        assert_eq!(response.hits, 0);
        assert_eq!(response.routes, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
