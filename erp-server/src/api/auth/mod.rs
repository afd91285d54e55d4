//! Authentication API
//!
//! Registration, login, email confirmation and account self-service.
//! `register`, `login` and `confirm-email` are public; the rest require a
//! valid token.

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::core::ServerState;

pub mod handler;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/confirm-email", post(handler::confirm_email))
        .route("/me", get(handler::me))
        .route("/change-password", post(handler::change_password))
        .route("/delete-account", delete(handler::delete_account))
}
