use std::ops::ControlFlow;
use std::sync::Arc;

use tracing::debug;

use super::{admin, bot_filter, classify, locale};
use super::{CacheSim, CacheStatus, Classification, Decision, GateRequest, StageResult};
use crate::config::{default_exempt_prefixes, Config};
use crate::identity::IdentityResolver;

/// Gating stages after classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LocaleResolver,
    BotFilter,
    AdminGate,
}

/// Order in which stages run for every request.
pub const STAGE_ORDER: [Stage; 3] = [Stage::LocaleResolver, Stage::BotFilter, Stage::AdminGate];

/// Result of running a request through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Excluded asset: served untouched, no stage ran
    Bypass,
    /// Every stage continued; `cache` is set when cache simulation is on
    Pass { cache: Option<CacheStatus> },
    /// A stage stopped the request
    Terminal { stage: Stage, decision: Decision },
}

#[derive(Debug, Clone)]
pub struct GateSettings {
    /// Run the bot filter on `/api` routes too
    pub filter_api_routes: bool,
    /// Paths the bot filter never inspects
    pub exempt_prefixes: Vec<String>,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            filter_api_routes: false,
            exempt_prefixes: default_exempt_prefixes(),
        }
    }
}

impl From<&Config> for GateSettings {
    fn from(config: &Config) -> Self {
        Self {
            filter_api_routes: config.filter_api_routes,
            exempt_prefixes: config.exempt_prefixes.clone(),
        }
    }
}

pub struct GatePipeline {
    settings: GateSettings,
    identity: IdentityResolver,
    cache_sim: Option<Arc<dyn CacheSim>>,
}

impl GatePipeline {
    pub fn new(settings: GateSettings, identity: IdentityResolver) -> Self {
        Self {
            settings,
            identity,
            cache_sim: None,
        }
    }

    /// Turn on the cache-simulation header.
    pub fn with_cache_sim(mut self, cache_sim: Arc<dyn CacheSim>) -> Self {
        self.cache_sim = Some(cache_sim);
        self
    }

    pub fn cache_sim(&self) -> Option<&Arc<dyn CacheSim>> {
        self.cache_sim.as_ref()
    }

    pub async fn evaluate(&self, request: &GateRequest<'_>) -> Outcome {
        let class = classify(request.path);
        if class == Classification::ExcludedAsset {
            return Outcome::Bypass;
        }

        for stage in STAGE_ORDER {
            if let ControlFlow::Break(decision) = self.run_stage(stage, class, request).await {
                debug!("{:?} stopped {} {}: {:?}", stage, request.method, request.path, decision);
                return Outcome::Terminal { stage, decision };
            }
        }

        Outcome::Pass {
            cache: self.cache_sim.as_ref().map(|sim| sim.observe(request.path)),
        }
    }

    /// Run a single stage. Stages that don't apply to `class` continue.
    pub async fn run_stage(
        &self,
        stage: Stage,
        class: Classification,
        request: &GateRequest<'_>,
    ) -> StageResult {
        match stage {
            Stage::LocaleResolver if class.is_page() => locale::resolve(request.path, request.query),
            Stage::BotFilter if self.bot_filter_applies(class, request) => bot_filter::check(request),
            Stage::AdminGate if class == Classification::AdminRoute => {
                let identity = self.identity.resolve(request.headers).await;
                admin::authorize(identity.as_ref(), request.path)
            }
            _ => ControlFlow::Continue(()),
        }
    }

    fn bot_filter_applies(&self, class: Classification, request: &GateRequest<'_>) -> bool {
        if class == Classification::ApiRoute && !self.settings.filter_api_routes {
            return false;
        }
        bot_filter::applies_to(request.method, request.path, &self.settings.exempt_prefixes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{ManualClock, WindowedCacheSim};
    use crate::identity::{sign_token, Claims, HmacVerifier};
    use axum::http::{header, HeaderMap, HeaderValue, Method};
    use std::time::Duration;

    const SECRET: &str = "pipeline-secret";
    const BROWSER_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/128.0";

    fn pipeline(settings: GateSettings) -> GatePipeline {
        let verifier = Arc::new(HmacVerifier::new(Some(SECRET.to_string())));
        GatePipeline::new(settings, IdentityResolver::new(verifier.clone(), verifier))
    }

    fn headers(user_agent: Option<&str>, role: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(ua) = user_agent {
            headers.insert(header::USER_AGENT, HeaderValue::from_str(ua).unwrap());
        }
        if let Some(role) = role {
            let claims = Claims {
                sub: Some("u-1".to_string()),
                role: Some(role.to_string()),
                exp: None,
            };
            let cookie = format!("next-auth.session-token={}", sign_token(&claims, SECRET).unwrap());
            headers.insert(header::COOKIE, HeaderValue::from_str(&cookie).unwrap());
        }
        headers
    }

    async fn evaluate(pipeline: &GatePipeline, method: Method, path: &str, headers: &HeaderMap) -> Outcome {
        pipeline
            .evaluate(&GateRequest::new(&method, path, None, headers))
            .await
    }

    #[test]
    fn test_stage_order() {
        assert_eq!(
            STAGE_ORDER,
            [Stage::LocaleResolver, Stage::BotFilter, Stage::AdminGate]
        );
    }

    #[tokio::test]
    async fn test_excluded_assets_bypass_everything() {
        let pipeline = pipeline(GateSettings::default());
        let no_headers = HeaderMap::new();

        for path in ["/_next/static/app.js", "/favicon.ico", "/logo.svg", "/robots.txt"] {
            assert_eq!(evaluate(&pipeline, Method::GET, path, &no_headers).await, Outcome::Bypass);
        }
    }

    #[tokio::test]
    async fn test_locale_redirect_runs_before_bot_filter() {
        let pipeline = pipeline(GateSettings::default());
        let outcome = evaluate(&pipeline, Method::GET, "/products", &headers(Some("curl/8.4.0"), None)).await;

        assert_eq!(
            outcome,
            Outcome::Terminal {
                stage: Stage::LocaleResolver,
                decision: Decision::Redirect("/en/products".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_bot_filter_rejects_on_locale_rooted_page() {
        let pipeline = pipeline(GateSettings::default());
        let outcome = evaluate(&pipeline, Method::GET, "/en/products", &headers(Some("curl/8.4.0"), None)).await;

        assert_eq!(
            outcome,
            Outcome::Terminal {
                stage: Stage::BotFilter,
                decision: Decision::Forbidden,
            }
        );
    }

    #[tokio::test]
    async fn test_bot_filter_runs_before_admin_gate() {
        let pipeline = pipeline(GateSettings::default());
        let outcome = evaluate(&pipeline, Method::GET, "/admin", &headers(None, Some("ADMIN"))).await;

        assert!(matches!(outcome, Outcome::Terminal { stage: Stage::BotFilter, .. }));
    }

    #[tokio::test]
    async fn test_admin_post_skips_bot_filter() {
        let pipeline = pipeline(GateSettings::default());
        let outcome = evaluate(&pipeline, Method::POST, "/admin/products", &headers(None, Some("ADMIN"))).await;

        assert_eq!(outcome, Outcome::Pass { cache: None });
    }

    #[tokio::test]
    async fn test_admin_gate_redirects_media_buyer() {
        let pipeline = pipeline(GateSettings::default());
        let buyer = headers(Some(BROWSER_UA), Some("MEDIA_BUYER"));

        assert_eq!(
            evaluate(&pipeline, Method::GET, "/admin/analytics", &buyer).await,
            Outcome::Pass { cache: None }
        );
        assert_eq!(
            evaluate(&pipeline, Method::GET, "/admin/orders", &buyer).await,
            Outcome::Terminal {
                stage: Stage::AdminGate,
                decision: Decision::Redirect("/en".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_api_routes_skip_bot_filter_by_default() {
        let pipeline = pipeline(GateSettings::default());
        let outcome = evaluate(&pipeline, Method::GET, "/api/reviews", &headers(Some("okhttp/4.12"), None)).await;

        assert_eq!(outcome, Outcome::Pass { cache: None });
    }

    #[tokio::test]
    async fn test_api_routes_filtered_when_enabled() {
        let pipeline = pipeline(GateSettings {
            filter_api_routes: true,
            ..GateSettings::default()
        });
        let curl = headers(Some("curl/8.4.0"), None);

        assert!(matches!(
            evaluate(&pipeline, Method::GET, "/api/reviews", &curl).await,
            Outcome::Terminal { stage: Stage::BotFilter, .. }
        ));
        assert_eq!(
            evaluate(&pipeline, Method::GET, "/api/auth/session", &curl).await,
            Outcome::Pass { cache: None }
        );
        assert_eq!(
            evaluate(&pipeline, Method::GET, "/api/paymob/webhooks/callback", &curl).await,
            Outcome::Pass { cache: None }
        );
    }

    #[tokio::test]
    async fn test_cache_sim_annotates_passing_requests() {
        let clock = ManualClock::new(0);
        let sim = Arc::new(WindowedCacheSim::new(clock.clone(), Duration::from_secs(60)));
        let pipeline = pipeline(GateSettings::default()).with_cache_sim(sim);
        let browser = headers(Some(BROWSER_UA), None);

        assert_eq!(
            evaluate(&pipeline, Method::GET, "/en/deals", &browser).await,
            Outcome::Pass { cache: Some(CacheStatus::Miss) }
        );
        clock.advance(Duration::from_secs(5));
        assert_eq!(
            evaluate(&pipeline, Method::GET, "/en/deals", &browser).await,
            Outcome::Pass { cache: Some(CacheStatus::Hit) }
        );
    }

    #[tokio::test]
    async fn test_cache_sim_not_consulted_for_terminal_or_bypass() {
        let clock = ManualClock::new(0);
        let sim = Arc::new(WindowedCacheSim::new(clock, Duration::from_secs(60)));
        let pipeline = pipeline(GateSettings::default()).with_cache_sim(sim.clone());

        evaluate(&pipeline, Method::GET, "/products", &HeaderMap::new()).await;
        evaluate(&pipeline, Method::GET, "/logo.png", &HeaderMap::new()).await;

        assert!(sim.is_empty());
    }
}
