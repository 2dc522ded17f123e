//! Lightweight user-agent filter for public GET traffic.
//!
//! This is noise reduction, not access control: it turns away the obvious
//! scripted clients and accepts that some will slip through or be misjudged.

use std::ops::ControlFlow;

use axum::http::Method;
use tracing::debug;

use super::{Decision, GateRequest, StageResult};

/// Search engines and social preview fetchers. A match here always wins.
pub const ALLOWED_BOTS: [&str; 9] = [
    "googlebot",
    "bingbot",
    "duckduckbot",
    "slurp",
    "facebookexternalhit",
    "facebookcatalog",
    "whatsapp",
    "twitterbot",
    "linkedinbot",
];

/// Generic HTTP libraries and CLI fetch tools
pub const KNOWN_BAD_CLIENTS: [&str; 12] = [
    "python-requests",
    "curl/",
    "wget/",
    "scrapy",
    "aiohttp",
    "httpclient",
    "libwww-perl",
    "go-http-client",
    "okhttp",
    "axios",
    "postmanruntime",
    "insomnia",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientClass {
    AllowedCrawler,
    KnownBadAutomation,
    Unknown,
}

/// Classify a user-agent string. Allow-list matches take precedence.
pub fn classify_user_agent(user_agent: &str) -> ClientClass {
    let ua = user_agent.to_lowercase();

    if ALLOWED_BOTS.iter().any(|bot| ua.contains(bot)) {
        ClientClass::AllowedCrawler
    } else if KNOWN_BAD_CLIENTS.iter().any(|client| ua.contains(client)) {
        ClientClass::KnownBadAutomation
    } else {
        ClientClass::Unknown
    }
}

/// Whether the filter looks at this request at all: GET requests outside the
/// exempt prefixes (payment webhooks, auth callbacks).
pub fn applies_to(method: &Method, path: &str, exempt_prefixes: &[String]) -> bool {
    *method == Method::GET && !exempt_prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
}

/// Reject requests with no user-agent or a known scripted-client signature.
pub fn check(request: &GateRequest<'_>) -> StageResult {
    let user_agent = request.user_agent();

    if user_agent.trim().is_empty() {
        debug!("Blocked {} without user-agent", request.path);
        return ControlFlow::Break(Decision::Forbidden);
    }

    match classify_user_agent(user_agent) {
        ClientClass::KnownBadAutomation => {
            debug!("Blocked scripted client on {}: {}", request.path, user_agent);
            ControlFlow::Break(Decision::Forbidden)
        }
        ClientClass::AllowedCrawler | ClientClass::Unknown => ControlFlow::Continue(()),
    }
}
