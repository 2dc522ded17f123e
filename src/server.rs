use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{middleware, Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::admin_api::AdminApiAuthorizer;
use crate::config::Config;
use crate::gate::{CacheSimReport, GatePipeline, GateSettings, WindowedCacheSim};
use crate::i18n::{LocaleConfig, LocaleRegistry};
use crate::identity::{HmacVerifier, IdentityResolver, RemoteVerifier, TokenVerifier};
use crate::middleware::{admin_api_guard, gate};
use crate::proxy::{ForwardError, Upstream, MAX_BODY_BYTES};

/// Gate diagnostics endpoint. Lives under `/api` so it is never locale-redirected.
pub const HEALTH_PATH: &str = "/api/gate/health";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<GatePipeline>,
    pub admin_api: Arc<AdminApiAuthorizer>,
    pub upstream: Arc<Upstream>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let timeout = Duration::from_secs(config.upstream_timeout_secs);

        if config.session_secret.is_none() {
            warn!("No session secret configured, every admin request will be redirected");
        }
        let session: Arc<dyn TokenVerifier> =
            Arc::new(HmacVerifier::new(config.session_secret.clone()));
        let bearer: Arc<dyn TokenVerifier> = match &config.identity_verify_url {
            Some(url) => {
                info!("Verifying bearer credentials with {}", url);
                Arc::new(RemoteVerifier::new(url.clone(), timeout).context("Failed to build identity client")?)
            }
            None => session.clone(),
        };
        let identity = IdentityResolver::new(session, bearer);

        let mut pipeline = GatePipeline::new(GateSettings::from(config), identity.clone());
        if config.cache_sim_enabled {
            info!("Cache simulation enabled, responses carry X-Local-Cache-Sim");
            pipeline = pipeline.with_cache_sim(Arc::new(WindowedCacheSim::with_default_window()));
        }

        let upstream =
            Upstream::new(&config.upstream_url, timeout).context("Failed to build upstream client")?;

        Ok(Self {
            pipeline: Arc::new(pipeline),
            admin_api: Arc::new(AdminApiAuthorizer::new(identity, config.admin_api_key.clone())),
            upstream: Arc::new(upstream),
        })
    }
}

/// Router: diagnostics route, everything else forwarded upstream. The gate
/// runs first, then the admin API guard.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(health))
        .fallback(forward)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn_with_state(state.clone(), admin_api_guard))
        .layer(middleware::from_fn_with_state(state.clone(), gate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    locales: Vec<LocaleSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache_sim: Option<CacheSimReport>,
}

#[derive(Debug, Serialize)]
struct LocaleSummary {
    code: &'static str,
    native_name: &'static str,
    dir: &'static str,
    default: bool,
}

impl From<&LocaleConfig> for LocaleSummary {
    fn from(config: &LocaleConfig) -> Self {
        Self {
            code: config.code,
            native_name: config.native_name,
            dir: config.direction.as_str(),
            default: config.is_default,
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        locales: LocaleRegistry::get()
            .list_enabled()
            .into_iter()
            .map(LocaleSummary::from)
            .collect(),
        cache_sim: state.pipeline.cache_sim().map(|sim| sim.report()),
    })
}

async fn forward(State(state): State<AppState>, request: Request) -> Response {
    let path = request.uri().path().to_string();
    match state.upstream.forward(request).await {
        Ok(response) => response,
        Err(ForwardError::TooLarge) => {
            warn!("Rejected {}: request body over {} bytes", path, MAX_BODY_BYTES);
            (StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large").into_response()
        }
        Err(e) => {
            error!("Failed to forward {} to {}: {}", path, state.upstream.base_url(), e);
            (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
        }
    }
}
