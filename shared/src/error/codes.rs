//! Unified error codes for the ERP backend
//!
//! This module defines all error codes used across the server and clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Company / invitation errors
//! - 4xxx: CRM errors
//! - 5xxx: Invoicing / finance errors
//! - 6xxx: Import errors
//! - 7xxx: Reconciliation errors
//! - 8xxx: User management errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Session has expired
    SessionExpired = 1005,
    /// Account is disabled
    AccountDisabled = 1006,
    /// Email address not confirmed
    EmailNotConfirmed = 1007,
    /// Password too short
    PasswordTooShort = 1008,
    /// Current password does not match
    PasswordMismatch = 1009,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Admin role required
    AdminRequired = 2003,
    /// Cannot demote the last admin
    LastAdminRole = 2004,
    /// Cannot deactivate the last active admin
    LastAdminActive = 2005,
    /// Cannot delete the last admin
    LastAdminDelete = 2006,
    /// Cannot modify own membership
    CannotModifySelf = 2007,

    // ==================== 3xxx: Company / Invitation ====================
    /// Company not found
    CompanyNotFound = 3001,
    /// No company membership for this user
    CompanyRequired = 3002,
    /// User already belongs to this company
    UserAlreadyInCompany = 3003,
    /// Invitation not found
    InvitationNotFound = 3004,
    /// Invitation has expired
    InvitationExpired = 3005,
    /// Invitation has already been accepted
    InvitationAlreadyAccepted = 3006,

    // ==================== 4xxx: CRM ====================
    /// Customer not found
    CustomerNotFound = 4001,
    /// Deal not found
    DealNotFound = 4101,

    // ==================== 5xxx: Invoicing / Finance ====================
    /// Invoice not found
    InvoiceNotFound = 5001,
    /// Invoice has linked cashflow records
    InvoiceHasCashflows = 5002,
    /// Cashflow record not found
    CashflowNotFound = 5101,
    /// Financial item not found
    FinancialItemNotFound = 5201,
    /// Financial item category does not belong to its section
    SectionCategoryMismatch = 5202,
    /// Bank balance not found
    BankBalanceNotFound = 5301,

    // ==================== 6xxx: Import ====================
    /// Import payload contains no rows
    ImportEmpty = 6001,

    // ==================== 7xxx: Reconciliation ====================
    /// Reconciliation session not found
    SessionNotFound = 7001,
    /// Reconciliation session is closed
    SessionClosed = 7002,
    /// Bank transaction not found
    TransactionNotFound = 7003,
    /// Bank transaction is not pending
    TransactionNotPending = 7004,
    /// Bank statement could not be parsed
    StatementParseFailed = 7005,
    /// Bank statement contains no transactions
    StatementEmpty = 7006,

    // ==================== 8xxx: User management ====================
    /// User not found
    UserNotFound = 8001,
    /// Email already registered
    UserEmailExists = 8002,
    /// Membership not found
    MembershipNotFound = 8003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Email service not configured
    EmailNotConfigured = 9101,
    /// Email delivery failed
    EmailSendFailed = 9102,
    /// Email settings are invalid
    EmailSettingsInvalid = 9103,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::SessionExpired => "Session has expired",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::EmailNotConfirmed => "Email address has not been confirmed",
            ErrorCode::PasswordTooShort => "Password must be at least 8 characters",
            ErrorCode::PasswordMismatch => "Current password does not match",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::LastAdminRole => "Cannot change the role of the only administrator",
            ErrorCode::LastAdminActive => "Cannot deactivate the last active administrator",
            ErrorCode::LastAdminDelete => "Cannot delete the only administrator",
            ErrorCode::CannotModifySelf => "Cannot modify own membership",

            // Company / invitation
            ErrorCode::CompanyNotFound => "Company not found",
            ErrorCode::CompanyRequired => "User has no active company membership",
            ErrorCode::UserAlreadyInCompany => "User already belongs to this company",
            ErrorCode::InvitationNotFound => "Invitation not found",
            ErrorCode::InvitationExpired => "Invitation has expired",
            ErrorCode::InvitationAlreadyAccepted => "Invitation has already been accepted",

            // CRM
            ErrorCode::CustomerNotFound => "Customer not found",
            ErrorCode::DealNotFound => "Deal not found",

            // Invoicing / finance
            ErrorCode::InvoiceNotFound => "Invoice not found",
            ErrorCode::InvoiceHasCashflows => "Invoice has linked cashflow records",
            ErrorCode::CashflowNotFound => "Cashflow record not found",
            ErrorCode::FinancialItemNotFound => "Financial item not found",
            ErrorCode::SectionCategoryMismatch => {
                "Financial item category does not belong to its section"
            }
            ErrorCode::BankBalanceNotFound => "Bank balance not found",

            // Import
            ErrorCode::ImportEmpty => "Import payload contains no rows",

            // Reconciliation
            ErrorCode::SessionNotFound => "Reconciliation session not found",
            ErrorCode::SessionClosed => "Reconciliation session is closed",
            ErrorCode::TransactionNotFound => "Bank transaction not found",
            ErrorCode::TransactionNotPending => "Bank transaction is not pending",
            ErrorCode::StatementParseFailed => "Bank statement could not be parsed",
            ErrorCode::StatementEmpty => "Bank statement contains no transactions",

            // User management
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UserEmailExists => "Email address is already registered",
            ErrorCode::MembershipNotFound => "Membership not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::EmailNotConfigured => "Email service not configured",
            ErrorCode::EmailSendFailed => "Email delivery failed",
            ErrorCode::EmailSettingsInvalid => "Email settings are invalid",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::SessionExpired),
            1006 => Ok(ErrorCode::AccountDisabled),
            1007 => Ok(ErrorCode::EmailNotConfirmed),
            1008 => Ok(ErrorCode::PasswordTooShort),
            1009 => Ok(ErrorCode::PasswordMismatch),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::AdminRequired),
            2004 => Ok(ErrorCode::LastAdminRole),
            2005 => Ok(ErrorCode::LastAdminActive),
            2006 => Ok(ErrorCode::LastAdminDelete),
            2007 => Ok(ErrorCode::CannotModifySelf),

            // Company / invitation
            3001 => Ok(ErrorCode::CompanyNotFound),
            3002 => Ok(ErrorCode::CompanyRequired),
            3003 => Ok(ErrorCode::UserAlreadyInCompany),
            3004 => Ok(ErrorCode::InvitationNotFound),
            3005 => Ok(ErrorCode::InvitationExpired),
            3006 => Ok(ErrorCode::InvitationAlreadyAccepted),

            // CRM
            4001 => Ok(ErrorCode::CustomerNotFound),
            4101 => Ok(ErrorCode::DealNotFound),

            // Invoicing / finance
            5001 => Ok(ErrorCode::InvoiceNotFound),
            5002 => Ok(ErrorCode::InvoiceHasCashflows),
            5101 => Ok(ErrorCode::CashflowNotFound),
            5201 => Ok(ErrorCode::FinancialItemNotFound),
            5202 => Ok(ErrorCode::SectionCategoryMismatch),
            5301 => Ok(ErrorCode::BankBalanceNotFound),

            // Import
            6001 => Ok(ErrorCode::ImportEmpty),

            // Reconciliation
            7001 => Ok(ErrorCode::SessionNotFound),
            7002 => Ok(ErrorCode::SessionClosed),
            7003 => Ok(ErrorCode::TransactionNotFound),
            7004 => Ok(ErrorCode::TransactionNotPending),
            7005 => Ok(ErrorCode::StatementParseFailed),
            7006 => Ok(ErrorCode::StatementEmpty),

            // User management
            8001 => Ok(ErrorCode::UserNotFound),
            8002 => Ok(ErrorCode::UserEmailExists),
            8003 => Ok(ErrorCode::MembershipNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9101 => Ok(ErrorCode::EmailNotConfigured),
            9102 => Ok(ErrorCode::EmailSendFailed),
            9103 => Ok(ErrorCode::EmailSettingsInvalid),

            other => Err(InvalidErrorCode(other)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
