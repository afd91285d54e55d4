//! Health check API (public)

use axum::{routing::get, Router};

use crate::core::ServerState;

pub mod handler;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/health", routes())
}

fn routes() -> Router<ServerState> {
    Router::new().route("/", get(handler::health))
}
