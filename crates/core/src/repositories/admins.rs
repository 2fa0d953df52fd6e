//! Admin roster management.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{DomainError, DomainResult};
use crate::models::Admin;
use crate::repositories::accounts::AccountService;

#[derive(Debug, Clone)]
pub struct AdminUpdate {
    pub name: String,
    pub email: String,
}

#[derive(Clone)]
pub struct AdminService {
    pool: SqlitePool,
}

impl AdminService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: i64) -> DomainResult<Admin> {
        sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DomainError::NotFound("admin"))
    }

    pub async fn list(&self) -> DomainResult<Vec<Admin>> {
        let rows = sqlx::query_as::<_, Admin>("SELECT * FROM admins ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn update(&self, id: i64, update: AdminUpdate) -> DomainResult<Admin> {
        let result = sqlx::query("UPDATE admins SET name = ?, email = ?, updated_at = ? WHERE id = ?")
            .bind(&update.name)
            .bind(&update.email)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound("admin"));
        }
        self.get(id).await
    }

    /// Delete the admin row and, when linked, its login account.
    pub async fn delete(&self, id: i64) -> DomainResult<()> {
        let admin = self.get(id).await?;

        let mut tx = self.pool.begin().await?;
        if let Some(account_id) = &admin.account_id {
            AccountService::delete_account_in_tx(&mut tx, account_id).await?;
        }
        sqlx::query("DELETE FROM admins WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(())
    }
}
