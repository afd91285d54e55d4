//! Cashflow API

use axum::{middleware as axum_middleware, routing::get, Router};

use crate::auth::require_edit;
use crate::core::ServerState;

pub mod handler;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cashflows", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_one)
                .put(handler::update)
                .delete(handler::remove),
        )
        .layer(axum_middleware::from_fn(require_edit))
}
