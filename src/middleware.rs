//! Axum middleware wiring the gate and the admin API checks into the router.

use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::admin_api::AdminApiAuthorizer;
use crate::gate::{GateRequest, Outcome, CACHE_SIM_HEADER};
use crate::server::AppState;

/// Run every request through the gating pipeline.
pub async fn gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let outcome = state
        .pipeline
        .evaluate(&GateRequest::new(
            &parts.method,
            parts.uri.path(),
            parts.uri.query(),
            &parts.headers,
        ))
        .await;
    let request = Request::from_parts(parts, body);

    match outcome {
        Outcome::Bypass => next.run(request).await,
        Outcome::Terminal { decision, .. } => decision.into_response(),
        Outcome::Pass { cache } => {
            let mut response = next.run(request).await;
            if let Some(status) = cache {
                response
                    .headers_mut()
                    .insert(CACHE_SIM_HEADER, HeaderValue::from_static(status.as_str()));
            }
            response
        }
    }
}

/// Require an admin or analytics credential on `/api/admin/**`.
pub async fn admin_api_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(roles) = AdminApiAuthorizer::required_roles(request.uri().path()) else {
        return next.run(request).await;
    };

    let (parts, body) = request.into_parts();
    if !state.admin_api.has_role(&parts.headers, roles).await {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))).into_response();
    }

    next.run(Request::from_parts(parts, body)).await
}
