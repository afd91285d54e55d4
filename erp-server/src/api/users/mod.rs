//! User management API
//!
//! Member listing, invitations and membership changes, admin only. The
//! invitation validation/completion endpoints are public so invited users
//! can accept before having an account.

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub mod handler;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", routes())
}

fn routes() -> Router<ServerState> {
    let admin = Router::new()
        .route("/", get(handler::list_members))
        .route("/invite", post(handler::invite))
        .route("/invitations", get(handler::list_invitations))
        .route("/invitations/{id}", delete(handler::delete_invitation))
        .route(
            "/{id}",
            put(handler::update_membership).delete(handler::remove_member),
        )
        .layer(axum_middleware::from_fn(require_admin));

    let public = Router::new()
        .route(
            "/validate-invitation/{token}",
            get(handler::validate_invitation),
        )
        .route("/complete-invitation", post(handler::complete_invitation));

    admin.merge(public)
}
