//! Company settings API

use axum::{middleware as axum_middleware, routing::get, Router};

use crate::auth::require_manage_company;
use crate::core::ServerState;

pub mod handler;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/settings", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/app", get(handler::get_app).put(handler::put_app))
        .route("/email", get(handler::get_email).put(handler::put_email))
        .layer(axum_middleware::from_fn(require_manage_company))
}
