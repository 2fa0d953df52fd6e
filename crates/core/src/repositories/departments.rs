//! Department directory CRUD.
//!
//! Deleting a department dissolves its roster: each doctor's treatment
//! records, appointments, and account go first, then the doctors, then
//! the department row — one transaction for the lot.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{DomainError, DomainResult};
use crate::models::{Department, Doctor};
use crate::repositories::accounts::AccountService;

#[derive(Debug, Clone)]
pub struct NewDepartment {
    pub hospital_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<Vec<u8>>,
}

#[derive(Clone)]
pub struct DepartmentService {
    pool: SqlitePool,
}

impl DepartmentService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewDepartment) -> DomainResult<Department> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO departments (hospital_id, name, description, image, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(new.hospital_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.image)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(result.last_insert_rowid()).await
    }

    pub async fn get(&self, id: i64) -> DomainResult<Department> {
        sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DomainError::NotFound("department"))
    }

    pub async fn list(&self) -> DomainResult<Vec<Department>> {
        let rows = sqlx::query_as::<_, Department>("SELECT * FROM departments ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_by_hospital(&self, hospital_id: i64) -> DomainResult<Vec<Department>> {
        let rows = sqlx::query_as::<_, Department>(
            "SELECT * FROM departments WHERE hospital_id = ? ORDER BY id",
        )
        .bind(hospital_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn doctors(&self, department_id: i64) -> DomainResult<Vec<Doctor>> {
        // 404 for an unknown department, not an empty roster.
        self.get(department_id).await?;
        let rows =
            sqlx::query_as::<_, Doctor>("SELECT * FROM doctors WHERE department_id = ? ORDER BY id")
                .bind(department_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }

    pub async fn update(&self, id: i64, update: NewDepartment) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE departments SET hospital_id = ?, name = ?, description = ?, \
             image = COALESCE(?, image), updated_at = ? WHERE id = ?",
        )
        .bind(update.hospital_id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.image)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound("department"));
        }
        Ok(())
    }

    /// Cascade delete of the department and everything under it.
    pub async fn delete(&self, id: i64) -> DomainResult<()> {
        self.get(id).await?;

        let mut tx = self.pool.begin().await?;

        let doctors = sqlx::query_as::<_, Doctor>("SELECT * FROM doctors WHERE department_id = ?")
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

        for doctor in &doctors {
            sqlx::query("DELETE FROM treatment_records WHERE doctor_id = ?")
                .bind(doctor.id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM appointments WHERE doctor_id = ?")
                .bind(doctor.id)
                .execute(&mut *tx)
                .await?;
            AccountService::delete_account_in_tx(&mut tx, &doctor.account_id).await?;
        }

        sqlx::query("DELETE FROM doctors WHERE department_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM departments WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
