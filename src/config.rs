use anyhow::{Context, Result};

/// Env flag value that turns on the cache-simulation header
pub const CACHE_SIM_ACTIVE: &str = "1";

/// Secret variables for session tokens, in lookup order
pub const SECRET_VARS: [&str; 2] = ["NEXTAUTH_SECRET", "AUTH_SECRET"];

#[derive(Debug, Clone)]
pub struct Config {
    // Upstream storefront
    pub upstream_url: String,
    pub upstream_timeout_secs: u64,

    // Identity
    pub session_secret: Option<String>,
    pub admin_api_key: Option<String>,
    pub identity_verify_url: Option<String>,

    // Gating
    pub cache_sim_enabled: bool,
    pub filter_api_routes: bool,
    pub exempt_prefixes: Vec<String>,

    // Server
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Upstream storefront
            upstream_url: std::env::var("UPSTREAM_URL")
                .context("UPSTREAM_URL not set")?
                .trim_end_matches('/')
                .to_string(),
            upstream_timeout_secs: std::env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),

            // Identity
            session_secret: resolve_secret(|name| std::env::var(name).ok()),
            admin_api_key: non_empty_var("ADMIN_MOBILE_API_KEY"),
            identity_verify_url: non_empty_var("IDENTITY_VERIFY_URL"),

            // Gating
            cache_sim_enabled: std::env::var("LOCAL_CACHE_SIM")
                .map(|v| v == CACHE_SIM_ACTIVE)
                .unwrap_or(false),
            filter_api_routes: std::env::var("GATE_FILTER_API_ROUTES")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            exempt_prefixes: std::env::var("GATE_EXEMPT_PREFIXES")
                .ok()
                .map(|v| parse_list(&v))
                .filter(|list| !list.is_empty())
                .unwrap_or_else(default_exempt_prefixes),

            // Server
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        })
    }
}

/// Paths the bot filter never inspects: payment webhooks and the auth subsystem
pub fn default_exempt_prefixes() -> Vec<String> {
    vec!["/api/paymob/webhooks".to_string(), "/api/auth".to_string()]
}

/// First non-empty value among `SECRET_VARS`
pub fn resolve_secret<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    SECRET_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.trim().is_empty())
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
