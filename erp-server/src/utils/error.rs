//! Error handling for HTTP handlers
//!
//! Re-exports the unified error types from `shared::error` and provides
//! the success-envelope helpers handlers use:
//!
//! ```ignore
//! use crate::utils::{ok, AppResult, ApiResponse};
//!
//! async fn list() -> AppResult<ApiResponse<Vec<Customer>>> {
//!     let customers = repo.find_all().await?;
//!     Ok(ok(customers))
//! }
//! ```

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

/// Wrap data in a success envelope
pub fn ok<T>(data: T) -> ApiResponse<T> {
    ApiResponse::success(data)
}

/// Wrap data in a success envelope with a custom message
pub fn ok_with_message<T>(message: impl Into<String>, data: T) -> ApiResponse<T> {
    ApiResponse::success_with_message(message, data)
}

impl From<crate::db::repository::RepoError> for AppError {
    fn from(err: crate::db::repository::RepoError) -> Self {
        use crate::db::repository::RepoError;
        match err {
            RepoError::NotFound(what) => AppError::not_found(what),
            RepoError::Duplicate(what) => AppError::conflict(what),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope() {
        let resp = ok(5);
        assert_eq!(resp.code, Some(0));
        assert_eq!(resp.data, Some(5));
    }

    #[test]
    fn test_repo_error_conversion() {
        use crate::db::repository::RepoError;

        let err: AppError = RepoError::NotFound("Customer".into()).into();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err: AppError = RepoError::Duplicate("email".into()).into();
        assert_eq!(err.code, ErrorCode::AlreadyExists);

        let err: AppError = RepoError::Database("boom".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
