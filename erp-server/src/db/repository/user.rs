//! User / Company / Membership / Invitation Repository

use super::{parse_id, BaseRepository, RepoError, RepoResult};
use crate::db::models::{
    Company, CompanyId, CompanyUser, CompanyUserDetail, Invitation, InvitationStatus,
    InviteCreate, Role, User, UserId,
};
use crate::utils::time::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

/// Invitations expire one week after creation
const INVITATION_TTL_MS: i64 = 7 * 24 * 60 * 60 * 1000;

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    // ---- users ----

    pub async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email_owned = email.to_lowercase();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email_owned))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    pub async fn find_user_by_id(&self, id: &UserId) -> RepoResult<Option<User>> {
        let user: Option<User> = self.base.db().select(id.clone()).await?;
        Ok(user)
    }

    /// Create the user, the company and the admin membership in one
    /// transaction so a failed step leaves nothing behind
    pub async fn register_company_admin(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
        company_name: &str,
    ) -> RepoResult<(User, Company, CompanyUser)> {
        if self.find_user_by_email(email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' already registered",
                email
            )));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"BEGIN TRANSACTION;
                LET $u = (CREATE user SET
                    email = $email,
                    name = $name,
                    password_hash = $password_hash,
                    email_confirmed = false,
                    created_at = $now
                RETURN AFTER);
                LET $c = (CREATE company SET
                    name = $company_name,
                    created_at = $now
                RETURN AFTER);
                CREATE company_user SET
                    company = $c[0].id,
                    user = $u[0].id,
                    role = 'admin',
                    is_active = true,
                    created_at = $now
                RETURN AFTER;
                RETURN $u[0];
                RETURN $c[0];
                COMMIT TRANSACTION;"#,
            )
            .bind(("email", email.to_lowercase()))
            .bind(("name", name.to_string()))
            .bind(("password_hash", password_hash.to_string()))
            .bind(("company_name", company_name.to_string()))
            .bind(("now", now_millis()))
            .await?;

        let membership: Option<CompanyUser> = result.take(2)?;
        let user: Option<User> = result.take(3)?;
        let company: Option<Company> = result.take(4)?;
        match (user, company, membership) {
            (Some(u), Some(c), Some(m)) => Ok((u, c, m)),
            _ => Err(RepoError::Database(
                "Failed to register company admin".to_string(),
            )),
        }
    }

    pub async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
        email_confirmed: bool,
    ) -> RepoResult<User> {
        if self.find_user_by_email(email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' already registered",
                email
            )));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE user SET
                    email = $email,
                    name = $name,
                    password_hash = $password_hash,
                    email_confirmed = $email_confirmed,
                    created_at = $now
                RETURN AFTER"#,
            )
            .bind(("email", email.to_lowercase()))
            .bind(("name", name.to_string()))
            .bind(("password_hash", password_hash.to_string()))
            .bind(("email_confirmed", email_confirmed))
            .bind(("now", now_millis()))
            .await?;

        let created: Option<User> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    pub async fn set_email_confirmed(&self, id: &UserId) -> RepoResult<User> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $user SET email_confirmed = true RETURN AFTER")
            .bind(("user", id.clone()))
            .await?;
        result
            .take::<Option<User>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    pub async fn update_password(&self, id: &UserId, password_hash: &str) -> RepoResult<()> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $user SET password_hash = $password_hash RETURN AFTER")
            .bind(("user", id.clone()))
            .bind(("password_hash", password_hash.to_string()))
            .await?;
        result
            .take::<Option<User>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))?;
        Ok(())
    }

    pub async fn delete_user(&self, id: &UserId) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE company_user WHERE user = $user; DELETE $user;")
            .bind(("user", id.clone()))
            .await?;
        Ok(())
    }

    // ---- companies ----

    pub async fn find_company(&self, id: &CompanyId) -> RepoResult<Option<Company>> {
        let company: Option<Company> = self.base.db().select(id.clone()).await?;
        Ok(company)
    }

    /// Every company in the store, for the background notification scan
    pub async fn list_companies(&self) -> RepoResult<Vec<Company>> {
        let companies: Vec<Company> = self
            .base
            .db()
            .query("SELECT * FROM company ORDER BY created_at")
            .await?
            .take(0)?;
        Ok(companies)
    }

    pub async fn update_company(
        &self,
        id: &CompanyId,
        name: Option<String>,
        logo_url: Option<String>,
    ) -> RepoResult<Company> {
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $company SET
                    name = $name OR name,
                    logo_url = $logo_url OR logo_url
                RETURN AFTER"#,
            )
            .bind(("company", id.clone()))
            .bind(("name", name))
            .bind(("logo_url", logo_url))
            .await?;
        result
            .take::<Option<Company>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Company {} not found", id)))
    }

    // ---- memberships ----

    pub async fn find_membership(
        &self,
        company: &CompanyId,
        user: &UserId,
    ) -> RepoResult<Option<CompanyUser>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM company_user WHERE company = $company AND user = $user LIMIT 1")
            .bind(("company", company.clone()))
            .bind(("user", user.clone()))
            .await?;
        let rows: Vec<CompanyUser> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// First membership of a user, used at login. Inactive memberships are
    /// returned too so login can explain the refusal.
    pub async fn find_membership_for_user(
        &self,
        user: &UserId,
    ) -> RepoResult<Option<CompanyUser>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM company_user WHERE user = $user ORDER BY created_at LIMIT 1",
            )
            .bind(("user", user.clone()))
            .await?;
        let rows: Vec<CompanyUser> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    pub async fn find_membership_by_id(
        &self,
        company: &CompanyId,
        id: &str,
    ) -> RepoResult<Option<CompanyUser>> {
        let thing = parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM company_user WHERE id = $thing AND company = $company LIMIT 1")
            .bind(("thing", thing))
            .bind(("company", company.clone()))
            .await?;
        let rows: Vec<CompanyUser> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// Memberships of a company joined with the user's email and name
    pub async fn list_members(&self, company: &CompanyId) -> RepoResult<Vec<CompanyUserDetail>> {
        let members: Vec<CompanyUserDetail> = self
            .base
            .db()
            .query(
                r#"SELECT *, user.email AS email, user.name AS name
                FROM company_user WHERE company = $company
                ORDER BY created_at"#,
            )
            .bind(("company", company.clone()))
            .await?
            .take(0)?;
        Ok(members)
    }

    pub async fn add_membership(
        &self,
        company: &CompanyId,
        user: &UserId,
        role: Role,
        is_active: bool,
    ) -> RepoResult<CompanyUser> {
        if self.find_membership(company, user).await?.is_some() {
            return Err(RepoError::Duplicate(
                "User already belongs to this company".to_string(),
            ));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE company_user SET
                    company = $company,
                    user = $user,
                    role = $role,
                    is_active = $is_active,
                    created_at = $now
                RETURN AFTER"#,
            )
            .bind(("company", company.clone()))
            .bind(("user", user.clone()))
            .bind(("role", role))
            .bind(("is_active", is_active))
            .bind(("now", now_millis()))
            .await?;

        let created: Option<CompanyUser> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create membership".to_string()))
    }

    pub async fn update_membership(
        &self,
        company: &CompanyId,
        id: &str,
        role: Option<Role>,
        is_active: Option<bool>,
    ) -> RepoResult<CompanyUser> {
        let thing = parse_id(id)?;
        self.find_membership_by_id(company, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Membership {} not found", id)))?;

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    role = IF $has_role THEN $role ELSE role END,
                    is_active = IF $has_is_active THEN $is_active ELSE is_active END
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("has_role", role.is_some()))
            .bind(("role", role))
            .bind(("has_is_active", is_active.is_some()))
            .bind(("is_active", is_active))
            .await?;

        result
            .take::<Option<CompanyUser>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Membership {} not found", id)))
    }

    pub async fn delete_membership(&self, company: &CompanyId, id: &str) -> RepoResult<bool> {
        let thing = parse_id(id)?;
        self.find_membership_by_id(company, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Membership {} not found", id)))?;
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }

    /// Active admins left in a company, for the last-admin guards
    pub async fn count_active_admins(&self, company: &CompanyId) -> RepoResult<i64> {
        let mut result = self
            .base
            .db()
            .query(
                r#"SELECT count() AS total FROM company_user
                WHERE company = $company AND role = 'admin' AND is_active = true
                GROUP ALL"#,
            )
            .bind(("company", company.clone()))
            .await?;

        #[derive(serde::Deserialize)]
        struct Count {
            total: i64,
        }
        let counts: Vec<Count> = result.take(0)?;
        Ok(counts.first().map(|c| c.total).unwrap_or(0))
    }

    // ---- invitations ----

    /// Create a pending invitation, replacing any earlier pending one for
    /// the same email in this company
    pub async fn create_invitation(
        &self,
        company: &CompanyId,
        invited_by: &UserId,
        data: InviteCreate,
    ) -> RepoResult<Invitation> {
        let now = now_millis();
        let token = uuid::Uuid::new_v4().to_string();

        let mut result = self
            .base
            .db()
            .query(
                r#"DELETE invitation WHERE company = $company AND email = $email AND status = 'pending';
                CREATE invitation SET
                    company = $company,
                    email = $email,
                    name = $name,
                    role = $role,
                    token = $token,
                    status = 'pending',
                    invited_by = $invited_by,
                    created_at = $now,
                    expires_at = $expires_at
                RETURN AFTER;"#,
            )
            .bind(("company", company.clone()))
            .bind(("email", data.email.to_lowercase()))
            .bind(("name", data.name))
            .bind(("role", data.role))
            .bind(("token", token))
            .bind(("invited_by", invited_by.clone()))
            .bind(("now", now))
            .bind(("expires_at", now + INVITATION_TTL_MS))
            .await?;

        let created: Option<Invitation> = result.take(1)?;
        created.ok_or_else(|| RepoError::Database("Failed to create invitation".to_string()))
    }

    pub async fn find_invitation_by_token(&self, token: &str) -> RepoResult<Option<Invitation>> {
        let token_owned = token.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM invitation WHERE token = $token LIMIT 1")
            .bind(("token", token_owned))
            .await?;
        let rows: Vec<Invitation> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    pub async fn list_pending_invitations(
        &self,
        company: &CompanyId,
    ) -> RepoResult<Vec<Invitation>> {
        let rows: Vec<Invitation> = self
            .base
            .db()
            .query(
                r#"SELECT * FROM invitation
                WHERE company = $company AND status = 'pending'
                ORDER BY created_at DESC"#,
            )
            .bind(("company", company.clone()))
            .await?
            .take(0)?;
        Ok(rows)
    }

    pub async fn mark_invitation_accepted(&self, invitation: &Invitation) -> RepoResult<()> {
        let id = invitation
            .id
            .clone()
            .ok_or_else(|| RepoError::Validation("Invitation has no id".to_string()))?;
        self.base
            .db()
            .query("UPDATE $thing SET status = $status")
            .bind(("thing", id))
            .bind(("status", InvitationStatus::Accepted))
            .await?;
        Ok(())
    }

    pub async fn delete_invitation(&self, company: &CompanyId, id: &str) -> RepoResult<bool> {
        let thing = parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM invitation WHERE id = $thing AND company = $company LIMIT 1")
            .bind(("thing", thing.clone()))
            .bind(("company", company.clone()))
            .await?;
        let rows: Vec<Invitation> = result.take(0)?;
        if rows.is_empty() {
            return Err(RepoError::NotFound(format!("Invitation {} not found", id)));
        }
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}
