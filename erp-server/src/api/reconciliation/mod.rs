//! Bank reconciliation API
//!
//! Statement upload, session lifecycle, matching and reporting. Everything
//! here mutates financial data, so the whole group needs the manage-company
//! capability.

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};

use crate::auth::require_manage_company;
use crate::core::ServerState;

pub mod handler;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reconciliation", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/sessions",
            get(handler::list_sessions).post(handler::upload_statement),
        )
        .route(
            "/sessions/{id}",
            get(handler::get_session).delete(handler::delete_session),
        )
        .route("/sessions/{id}/close", post(handler::close_session))
        .route("/sessions/{id}/reopen", post(handler::reopen_session))
        .route("/sessions/{id}/transactions", get(handler::list_transactions))
        .route(
            "/sessions/{id}/transactions/delete",
            post(handler::delete_transactions),
        )
        .route("/sessions/{id}/suggest", post(handler::suggest_session))
        .route("/sessions/{id}/report", get(handler::report))
        .route("/sessions/{id}/side-by-side", get(handler::side_by_side))
        .route("/sessions/{id}/unmatched", get(handler::unmatched))
        .route("/transactions/{id}", delete(handler::delete_transaction))
        .route("/transactions/{id}/suggest", post(handler::suggest_transaction))
        .route("/transactions/{id}/confirm", post(handler::confirm_match))
        .route("/transactions/{id}/ignore", post(handler::ignore_transaction))
        .route("/transactions/{id}/match", post(handler::manual_match))
        .route("/transactions/{id}/unmatch", post(handler::unmatch))
        .route(
            "/transactions/{id}/create-invoice",
            post(handler::create_invoice_from_transaction),
        )
        .route(
            "/transactions/{id}/create-cashflow",
            post(handler::create_cashflow_from_transaction),
        )
        .route("/repair-orphans", post(handler::repair_orphans))
        .layer(axum_middleware::from_fn(require_manage_company))
}
