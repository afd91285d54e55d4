//! Invoice due-date notification API

use axum::{
    routing::{get, post},
    Router,
};

use crate::core::ServerState;

pub mod handler;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/notifications", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/refresh", post(handler::refresh))
        .route("/{id}/dismiss", post(handler::dismiss))
}
