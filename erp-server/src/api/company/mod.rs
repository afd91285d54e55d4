//! Company profile API

use axum::{
    middleware as axum_middleware,
    routing::{get, put},
    Router,
};

use crate::auth::require_manage_company;
use crate::core::ServerState;

pub mod handler;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/company", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::get_company))
        .route(
            "/",
            put(handler::update_company)
                .layer(axum_middleware::from_fn(require_manage_company)),
        )
}
