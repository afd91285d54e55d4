//! Statistics API

use axum::{routing::get, Router};

use crate::core::ServerState;

pub mod handler;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/statistics", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/cashflow/{anno}", get(handler::cashflow_stats))
        .route("/invoices/{anno}", get(handler::invoice_stats))
        .route("/financial-statement", get(handler::financial_statement))
        .route("/dashboard", get(handler::dashboard))
}
