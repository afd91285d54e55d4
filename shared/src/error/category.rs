//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: Company / invitation errors
/// - 4xxx: CRM errors
/// - 5xxx: Invoicing / finance errors
/// - 6xxx: Import errors
/// - 7xxx: Reconciliation errors
/// - 8xxx: User management errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Company / invitation errors (3xxx)
    Company,
    /// CRM errors (4xxx)
    Crm,
    /// Invoicing / finance errors (5xxx)
    Finance,
    /// Import errors (6xxx)
    Import,
    /// Reconciliation errors (7xxx)
    Reconciliation,
    /// User management errors (8xxx)
    User,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Company,
            4000..5000 => Self::Crm,
            5000..6000 => Self::Finance,
            6000..7000 => Self::Import,
            7000..8000 => Self::Reconciliation,
            8000..9000 => Self::User,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Company => "company",
            Self::Crm => "crm",
            Self::Finance => "finance",
            Self::Import => "import",
            Self::Reconciliation => "reconciliation",
            Self::User => "user",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(8), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);

        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(3004), ErrorCategory::Company);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Crm);
        assert_eq!(ErrorCategory::from_code(5101), ErrorCategory::Finance);
        assert_eq!(ErrorCategory::from_code(6001), ErrorCategory::Import);
        assert_eq!(
            ErrorCategory::from_code(7005),
            ErrorCategory::Reconciliation
        );
        assert_eq!(ErrorCategory::from_code(8001), ErrorCategory::User);
        assert_eq!(ErrorCategory::from_code(9002), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::Success.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::NotAuthenticated.category(), ErrorCategory::Auth);
        assert_eq!(
            ErrorCode::LastAdminActive.category(),
            ErrorCategory::Permission
        );
        assert_eq!(
            ErrorCode::InvitationExpired.category(),
            ErrorCategory::Company
        );
        assert_eq!(ErrorCode::CustomerNotFound.category(), ErrorCategory::Crm);
        assert_eq!(
            ErrorCode::InvoiceHasCashflows.category(),
            ErrorCategory::Finance
        );
        assert_eq!(
            ErrorCode::SessionClosed.category(),
            ErrorCategory::Reconciliation
        );
        assert_eq!(ErrorCode::UserEmailExists.category(), ErrorCategory::User);
        assert_eq!(ErrorCode::InternalError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serialize() {
        let category = ErrorCategory::Auth;
        let json = serde_json::to_string(&category).unwrap();
        assert_eq!(json, "\"auth\"");

        let category = ErrorCategory::Reconciliation;
        let json = serde_json::to_string(&category).unwrap();
        assert_eq!(json, "\"reconciliation\"");
    }
}
