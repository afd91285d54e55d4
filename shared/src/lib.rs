//! Shared types for the ERP backend
//!
//! Common types used across server and client crates: error codes,
//! the API response envelope, and auth/user DTOs.

pub mod client;
pub mod error;
pub mod response;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use response::Pagination;
