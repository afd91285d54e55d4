//! Unified error handling
//!
//! Every failure the API can report is identified by a stable numeric
//! [`ErrorCode`], grouped into categories by code range. [`AppError`] pairs a
//! code with a human-readable message and optional structured details;
//! [`ApiResponse`] is the JSON envelope all endpoints reply with.
//!
//! # Usage
//!
//! ```ignore
//! use shared::{AppError, AppResult, ErrorCode};
//!
//! fn find_customer(id: &str) -> AppResult<Customer> {
//!     lookup(id).ok_or_else(|| AppError::not_found("Customer"))
//! }
//! ```

pub mod category;
pub mod codes;
pub mod http;
pub mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
