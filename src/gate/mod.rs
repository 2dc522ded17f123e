//! Request gating pipeline.
//!
//! Every inbound request is classified, then passes through an ordered list
//! of stages. Each stage either continues or returns a terminal [`Decision`];
//! the runner stops at the first terminal decision.
//!
//! # Stages
//!
//! - `locale`: keeps every page locale-rooted
//! - `bot_filter`: rejects scripted HTTP clients on GET requests
//! - `admin`: role-gates the admin area
//! - `cache_sim`: stamps a synthetic HIT/MISS header (diagnostics only)

pub mod admin;
pub mod bot_filter;
pub mod cache_sim;
pub mod classify;
pub mod locale;
mod pipeline;

use std::ops::ControlFlow;

use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};

pub use cache_sim::{CacheSim, CacheSimReport, CacheStatus, Clock, ManualClock, SystemClock, WindowedCacheSim};
pub use classify::{classify, Classification};
pub use pipeline::{GatePipeline, GateSettings, Outcome, Stage, STAGE_ORDER};

/// Response header carrying the cache-simulation result
pub const CACHE_SIM_HEADER: &str = "x-local-cache-sim";

/// The parts of a request the pipeline looks at.
#[derive(Debug, Clone, Copy)]
pub struct GateRequest<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub headers: &'a HeaderMap,
}

impl<'a> GateRequest<'a> {
    pub fn new(method: &'a Method, path: &'a str, query: Option<&'a str>, headers: &'a HeaderMap) -> Self {
        Self {
            method,
            path,
            query,
            headers,
        }
    }

    pub fn user_agent(&self) -> &'a str {
        self.headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }
}

/// A stage outcome that ends evaluation of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// 302 to a locale-rooted path
    Redirect(String),
    /// 403 with a plain-text body
    Forbidden,
}

/// `Continue(())` hands the request to the next stage.
pub type StageResult = ControlFlow<Decision>;

impl IntoResponse for Decision {
    fn into_response(self) -> Response {
        match self {
            Decision::Redirect(target) => match HeaderValue::from_str(&target) {
                Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
                Err(_) => (
                    StatusCode::FOUND,
                    [(header::LOCATION, HeaderValue::from_static("/"))],
                )
                    .into_response(),
            },
            Decision::Forbidden => (StatusCode::FORBIDDEN, "Forbidden").into_response(),
        }
    }
}
