//! HTTP API
//!
//! One module per resource, each exposing a `router()` that nests its
//! routes under `/api/<resource>`. [`build_app`] assembles them with the
//! shared middleware stack and the server state.

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::require_auth;
use crate::core::ServerState;

pub mod middleware;

pub mod auth;
pub mod bank_balances;
pub mod cashflows;
pub mod company;
pub mod customers;
pub mod deals;
pub mod email;
pub mod financial_items;
pub mod health;
pub mod import;
pub mod invoices;
pub mod notifications;
pub mod reconciliation;
pub mod settings;
pub mod statistics;
pub mod users;

/// Request ID generator for the `x-request-id` header
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(company::router())
        .merge(customers::router())
        .merge(deals::router())
        .merge(invoices::router())
        .merge(cashflows::router())
        .merge(financial_items::router())
        .merge(bank_balances::router())
        .merge(reconciliation::router())
        .merge(notifications::router())
        .merge(import::router())
        .merge(settings::router())
        .merge(email::router())
        .merge(statistics::router())
        .merge(health::router())
}

/// Build the fully configured application: routes, middleware stack, state
pub fn build_app(state: ServerState) -> Router {
    build_router()
        // CORS - handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Gzip compress responses
        .layer(CompressionLayer::new())
        // Access logging
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        // Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        // Unique ID per request, propagated to the response
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        // JWT authentication - runs before routing, injects CurrentUser
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
        .with_state(state)
}
