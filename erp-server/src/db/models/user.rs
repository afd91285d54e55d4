//! User, Company, and Membership Models
//!
//! A user account is global (one row per email); membership in a company is
//! the `company_user` join row carrying the role and active flag. All
//! authorization decisions are made against the membership, not the user.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use surrealdb::RecordId;

/// User ID type
pub type UserId = RecordId;
/// Company ID type
pub type CompanyId = RecordId;
/// Membership ID type
pub type CompanyUserId = RecordId;
/// Invitation ID type
pub type InvitationId = RecordId;

/// Membership role within a company
///
/// Capability matrix:
///
/// | Capability        | admin | manager | user | viewer |
/// |-------------------|-------|---------|------|--------|
/// | manage users      | ✓     |         |      |        |
/// | manage company    | ✓     | ✓       |      |        |
/// | edit / delete     | ✓     | ✓       | ✓    |        |
/// | import data       | ✓     | ✓       |      |        |
/// | reconcile         | ✓     | ✓       |      |        |
/// | view              | ✓     | ✓       | ✓    | ✓      |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    User,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::User => "user",
            Role::Viewer => "viewer",
        }
    }

    /// Only admins manage users and invitations
    pub fn can_manage_users(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Admins and managers manage company settings
    pub fn can_manage_company(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }

    /// Everyone except viewers mutates business data
    pub fn can_edit(&self) -> bool {
        !matches!(self, Role::Viewer)
    }

    /// Admins and managers run imports
    pub fn can_import(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }

    /// Admins and managers run bank reconciliation
    pub fn can_reconcile(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "user" => Ok(Role::User),
            "viewer" => Ok(Role::Viewer),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// User account matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<UserId>,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub email_confirmed: bool,
    pub created_at: i64,
}

impl User {
    /// Verify password using argon2
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };

        let parsed_hash = PasswordHash::new(&self.password_hash)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash password using argon2
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }
}

/// Company (tenant) record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<CompanyId>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub created_at: i64,
}

/// Membership row scoping a user into a company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyUser {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<CompanyUserId>,
    #[serde(with = "serde_helpers::record_id")]
    pub company: CompanyId,
    #[serde(with = "serde_helpers::record_id")]
    pub user: UserId,
    pub role: Role,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

/// Membership joined with user identity, as listed by the user management API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyUserDetail {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<CompanyUserId>,
    #[serde(with = "serde_helpers::record_id")]
    pub user: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: i64,
}

/// Invitation lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
}

/// Pending invitation into a company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<InvitationId>,
    #[serde(with = "serde_helpers::record_id")]
    pub company: CompanyId,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub token: String,
    pub status: InvitationStatus,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub invited_by: Option<UserId>,
    pub created_at: i64,
    pub expires_at: i64,
}

impl Invitation {
    /// True when the invitation has passed its expiry timestamp
    pub fn is_expired(&self, now_millis: i64) -> bool {
        now_millis > self.expires_at
    }
}

/// Invite payload (admin creating an invitation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteCreate {
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// Membership update payload (role change / active toggle)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_matrix() {
        assert!(Role::Admin.can_manage_users());
        assert!(!Role::Manager.can_manage_users());

        assert!(Role::Admin.can_manage_company());
        assert!(Role::Manager.can_manage_company());
        assert!(!Role::User.can_manage_company());

        assert!(Role::User.can_edit());
        assert!(!Role::Viewer.can_edit());

        assert!(Role::Manager.can_import());
        assert!(!Role::User.can_import());
        assert!(Role::Manager.can_reconcile());
        assert!(!Role::Viewer.can_reconcile());
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let r: Role = serde_json::from_str("\"viewer\"").unwrap();
        assert_eq!(r, Role::Viewer);
    }

    #[test]
    fn test_password_roundtrip() {
        let hash = User::hash_password("s3cret-pass").unwrap();
        let user = User {
            id: None,
            email: "a@b.it".into(),
            name: "A".into(),
            password_hash: hash,
            email_confirmed: false,
            created_at: 0,
        };
        assert!(user.verify_password("s3cret-pass").unwrap());
        assert!(!user.verify_password("wrong").unwrap());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: None,
            email: "a@b.it".into(),
            name: "A".into(),
            password_hash: "secret".into(),
            email_confirmed: true,
            created_at: 0,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_invitation_expiry() {
        let inv = Invitation {
            id: None,
            company: RecordId::from_table_key("company", "c1"),
            email: "a@b.it".into(),
            name: "A".into(),
            role: Role::User,
            token: "tok".into(),
            status: InvitationStatus::Pending,
            invited_by: None,
            created_at: 0,
            expires_at: 1000,
        };
        assert!(!inv.is_expired(999));
        assert!(inv.is_expired(1001));
    }
}
