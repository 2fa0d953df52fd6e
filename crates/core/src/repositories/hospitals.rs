//! Hospital directory CRUD.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{DomainError, DomainResult};
use crate::models::Hospital;

#[derive(Debug, Clone)]
pub struct NewHospital {
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub image: Option<Vec<u8>>,
}

#[derive(Clone)]
pub struct HospitalService {
    pool: SqlitePool,
}

impl HospitalService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewHospital) -> DomainResult<Hospital> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO hospitals (name, address, phone, email, image, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new.name)
        .bind(&new.address)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(&new.image)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(result.last_insert_rowid()).await
    }

    pub async fn get(&self, id: i64) -> DomainResult<Hospital> {
        sqlx::query_as::<_, Hospital>("SELECT * FROM hospitals WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DomainError::NotFound("hospital"))
    }

    pub async fn list(&self) -> DomainResult<Vec<Hospital>> {
        let rows = sqlx::query_as::<_, Hospital>("SELECT * FROM hospitals ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Rewrite a hospital's fields; a `None` image leaves the stored
    /// image untouched.
    pub async fn update(&self, id: i64, update: NewHospital) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE hospitals SET name = ?, address = ?, phone = ?, email = ?, \
             image = COALESCE(?, image), updated_at = ? WHERE id = ?",
        )
        .bind(&update.name)
        .bind(&update.address)
        .bind(&update.phone)
        .bind(&update.email)
        .bind(&update.image)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound("hospital"));
        }
        Ok(())
    }

    /// Plain row delete — departments and doctors under the hospital are
    /// managed through their own endpoints.
    pub async fn delete(&self, id: i64) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM hospitals WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound("hospital"));
        }
        Ok(())
    }
}
