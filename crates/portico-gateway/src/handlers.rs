// SPDX-FileCopyrightText: 2026 Portico Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway.
//!
//! Plugin routes all go through [`dispatch`], which builds the per-request
//! context, runs the bound controller action and turns the context (or the
//! action's error) into an HTTP response.

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use portico_core::{RequestContext, ResolutionError, ResponseFormat};
use serde::Serialize;
use tracing::{debug, error};

use crate::controller::Action;
use crate::server::HealthState;

/// Header carrying the per-request identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied request id that is reused rather than replaced.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Everything a plugin route needs to serve a request.
#[derive(Clone)]
pub struct RouteState {
    /// `plugin:handler` label used in logs.
    pub label: String,
    /// Controller action bound to the route.
    pub action: Action,
    /// Wire format for string bodies.
    pub format: ResponseFormat,
}

impl std::fmt::Debug for RouteState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteState")
            .field("label", &self.label)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status string.
    pub status: String,
    /// Binary version.
    pub version: String,
    /// Seconds since the gateway started.
    pub uptime_secs: u64,
    /// Number of enabled plugins.
    pub plugins: usize,
}

/// Run a plugin route's action for one request.
pub async fn dispatch(state: RouteState, method: Method, uri: Uri, headers: HeaderMap) -> Response {
    let request_id = request_id(&headers);
    let mut ctx = RequestContext::new(request_id, method.as_str(), uri.path());

    let result = (state.action)(&mut ctx);
    let mut response = match result {
        Ok(()) => context_response(&mut ctx, state.format),
        Err(err) => {
            error!(
                request_id = %ctx.request_id,
                route = %state.label,
                plugin = %err.plugin(),
                error = %err,
                "controller failed to resolve its service"
            );
            resolution_failure(&err)
        }
    };

    debug!(
        request_id = %ctx.request_id,
        route = %state.label,
        status = response.status().as_u16(),
        "request handled"
    );

    if let Ok(value) = HeaderValue::from_str(&ctx.request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

/// Turn a handled context into a response.
///
/// A context whose body was never set becomes `404 Not Found`.
pub fn context_response(ctx: &mut RequestContext, format: ResponseFormat) -> Response {
    let Some(body) = ctx.take_body() else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Not Found".to_string(),
            }),
        )
            .into_response();
    };

    match format {
        ResponseFormat::Text => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, format.content_type())],
            body,
        )
            .into_response(),
        ResponseFormat::Json => (StatusCode::OK, Json(body)).into_response(),
    }
}

/// The response sent when a controller cannot reach its service.
pub fn resolution_failure(err: &ResolutionError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// GET /health
pub async fn get_health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        plugins: state.plugins,
    })
}

/// Reuse a sane client-supplied request id, otherwise mint a new one.
fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}
