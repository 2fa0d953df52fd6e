//! Identity accounts, roles, and credential checks.
//!
//! Accounts are the login identities; the domain tables (patients,
//! doctors, admins) carry a back-reference to an account id. Role
//! resolution here feeds the `userSpecificId` claim: the first domain
//! table matching a role, in patient → doctor → admin precedence order,
//! supplies the id.

use chrono::Utc;
use pbkdf2::password_hash::rand_core::OsRng;
use pbkdf2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::Pbkdf2;
use serde::Serialize;
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::Account;

/// A named role, e.g. `patient`, `doctor`, `admin`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

#[derive(Clone)]
pub struct AccountService {
    pool: SqlitePool,
}

impl AccountService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Hash a password with PBKDF2 in PHC string format.
    pub fn hash_password(password: &str) -> DomainResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Pbkdf2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::PasswordHash(e.to_string()))
    }

    /// Verify a password against a stored PHC hash.
    pub fn verify_password(password: &str, stored: &str) -> bool {
        match PasswordHash::new(stored) {
            Ok(parsed) => Pbkdf2.verify_password(password.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }

    pub async fn find_by_email(&self, email: &str) -> DomainResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    /// Check credentials and return the account.
    ///
    /// Missing account and wrong password are indistinguishable to the
    /// caller; both surface as `Unauthorized`.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> DomainResult<Account> {
        let account = self
            .find_by_email(email)
            .await?
            .ok_or(DomainError::Unauthorized)?;

        if !Self::verify_password(password, &account.password_hash) {
            return Err(DomainError::Unauthorized);
        }

        Ok(account)
    }

    /// Create an account with one initial role and return its id.
    ///
    /// Fails with a validation error when the email is already taken.
    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
        role: &str,
    ) -> DomainResult<String> {
        if self.find_by_email(email).await?.is_some() {
            return Err(DomainError::Validation(format!(
                "an account already exists for {email}"
            )));
        }

        let id = Uuid::new_v4().to_string();
        let hash = Self::hash_password(password)?;

        sqlx::query(
            "INSERT INTO accounts (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(email)
        .bind(&hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.ensure_role(role).await?;
        self.grant_role(&id, role).await?;

        Ok(id)
    }

    /// Create the role if it does not exist. Returns true when it was
    /// newly created.
    pub async fn ensure_role(&self, name: &str) -> DomainResult<bool> {
        let result = sqlx::query("INSERT OR IGNORE INTO roles (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Create each role that does not already exist; returns the names
    /// that were newly created.
    pub async fn add_roles(&self, names: &[String]) -> DomainResult<Vec<String>> {
        let mut created = Vec::new();
        for name in names {
            if self.ensure_role(name).await? {
                created.push(name.clone());
            }
        }
        Ok(created)
    }

    pub async fn list_roles(&self) -> DomainResult<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>("SELECT id, name FROM roles ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(roles)
    }

    pub async fn roles_for_account(&self, account_id: &str) -> DomainResult<Vec<String>> {
        let roles = sqlx::query_scalar::<_, String>(
            "SELECT r.name FROM roles r \
             JOIN account_roles ar ON ar.role_id = r.id \
             WHERE ar.account_id = ? ORDER BY r.id",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }

    pub async fn roles_for_email(&self, email: &str) -> DomainResult<Vec<String>> {
        let account = self
            .find_by_email(email)
            .await?
            .ok_or(DomainError::NotFound("account"))?;
        self.roles_for_account(&account.id).await
    }

    async fn grant_role(&self, account_id: &str, role: &str) -> DomainResult<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO account_roles (account_id, role_id) \
             SELECT ?, id FROM roles WHERE name = ?",
        )
        .bind(account_id)
        .bind(role)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Assign a set of existing roles to the account behind an email.
    ///
    /// Every requested role must already exist; unknown names reject the
    /// whole call.
    pub async fn assign_roles(&self, email: &str, roles: &[String]) -> DomainResult<()> {
        let account = self
            .find_by_email(email)
            .await?
            .ok_or(DomainError::NotFound("account"))?;

        for role in roles {
            let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM roles WHERE name = ?")
                .bind(role)
                .fetch_optional(&self.pool)
                .await?;
            if exists.is_none() {
                return Err(DomainError::Validation(format!("unknown role: {role}")));
            }
        }

        for role in roles {
            self.grant_role(&account.id, role).await?;
        }

        Ok(())
    }

    /// Resolve the domain-specific id for the `userSpecificId` claim.
    ///
    /// Precedence: patient, then doctor, then admin. `None` when no
    /// domain row links back to the account — the token is still issued
    /// without the claim.
    pub async fn resolve_user_specific_id(
        &self,
        account_id: &str,
        roles: &[String],
    ) -> DomainResult<Option<i64>> {
        let lookups: [(&str, &str); 3] = [
            ("patient", "SELECT id FROM patients WHERE account_id = ?"),
            ("doctor", "SELECT id FROM doctors WHERE account_id = ?"),
            ("admin", "SELECT id FROM admins WHERE account_id = ?"),
        ];

        for (role, query) in lookups {
            if roles.iter().any(|r| r == role) {
                let id: Option<i64> = sqlx::query_scalar(query)
                    .bind(account_id)
                    .fetch_optional(&self.pool)
                    .await?;
                return Ok(id);
            }
        }

        Ok(None)
    }

    /// Delete an account and its role links inside a caller-owned
    /// transaction. Used by the cascade deletes of patients and doctors.
    pub async fn delete_account_in_tx(
        conn: &mut SqliteConnection,
        account_id: &str,
    ) -> DomainResult<()> {
        sqlx::query("DELETE FROM account_roles WHERE account_id = ?")
            .bind(account_id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(account_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
