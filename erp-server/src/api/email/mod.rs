//! Email dispatch API

use axum::{middleware as axum_middleware, routing::post, Router};

use crate::auth::require_manage_company;
use crate::core::ServerState;

pub mod handler;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/email", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/send-invitation", post(handler::send_invitation))
        .route("/test", post(handler::send_test))
        .layer(axum_middleware::from_fn(require_manage_company))
}
