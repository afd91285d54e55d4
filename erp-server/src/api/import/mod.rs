//! Unified data import API

use axum::{middleware as axum_middleware, routing::post, Router};

use crate::auth::require_manage_company;
use crate::core::ServerState;

pub mod handler;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/import", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::import))
        .layer(axum_middleware::from_fn(require_manage_company))
}
