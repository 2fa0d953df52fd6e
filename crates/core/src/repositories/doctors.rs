//! Doctor roster management.
//!
//! Registering a doctor creates the login account (with the `doctor`
//! role) and the roster row. Deleting one removes, in order: treatment
//! records, appointments, the account and its roles, then the doctor —
//! all inside one transaction.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{DomainError, DomainResult};
use crate::models::Doctor;
use crate::repositories::accounts::AccountService;

#[derive(Debug, Clone)]
pub struct NewDoctor {
    pub email: String,
    pub password: String,
    pub hospital_id: i64,
    pub department_id: i64,
    pub name: String,
    pub specialization: Option<String>,
    pub phone: Option<String>,
    pub degree: Option<String>,
    pub experience: Option<String>,
    pub fees: Option<f64>,
    pub is_available: bool,
    pub image: Option<Vec<u8>>,
}

/// Update payload. Hospital/department ids of 0 mean "keep the current
/// assignment", mirroring how the admin console submits partial edits.
#[derive(Debug, Clone)]
pub struct DoctorUpdate {
    pub hospital_id: i64,
    pub department_id: i64,
    pub name: String,
    pub specialization: Option<String>,
    pub phone: Option<String>,
    pub degree: Option<String>,
    pub experience: Option<String>,
    pub fees: Option<f64>,
    pub image: Option<Vec<u8>>,
}

#[derive(Clone)]
pub struct DoctorService {
    pool: SqlitePool,
    accounts: AccountService,
}

impl DoctorService {
    pub fn new(pool: SqlitePool) -> Self {
        let accounts = AccountService::new(pool.clone());
        Self { pool, accounts }
    }

    /// Register a doctor: account with the `doctor` role, then the
    /// roster row.
    pub async fn register(&self, new: NewDoctor) -> DomainResult<Doctor> {
        let account_id = self
            .accounts
            .create_account(&new.email, &new.password, "doctor")
            .await?;

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO doctors \
             (account_id, hospital_id, department_id, name, specialization, phone, email, \
              degree, experience, fees, is_available, image, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&account_id)
        .bind(new.hospital_id)
        .bind(new.department_id)
        .bind(&new.name)
        .bind(&new.specialization)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(&new.degree)
        .bind(&new.experience)
        .bind(new.fees)
        .bind(new.is_available)
        .bind(&new.image)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(result.last_insert_rowid()).await
    }

    pub async fn get(&self, id: i64) -> DomainResult<Doctor> {
        sqlx::query_as::<_, Doctor>("SELECT * FROM doctors WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DomainError::NotFound("doctor"))
    }

    pub async fn list(&self) -> DomainResult<Vec<Doctor>> {
        let rows = sqlx::query_as::<_, Doctor>("SELECT * FROM doctors ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn update(&self, id: i64, update: DoctorUpdate) -> DomainResult<Doctor> {
        let existing = self.get(id).await?;

        let hospital_id = if update.hospital_id == 0 {
            existing.hospital_id
        } else {
            update.hospital_id
        };
        let department_id = if update.department_id == 0 {
            existing.department_id
        } else {
            update.department_id
        };

        sqlx::query(
            "UPDATE doctors SET hospital_id = ?, department_id = ?, name = ?, \
             specialization = ?, phone = ?, degree = ?, experience = ?, fees = ?, \
             image = COALESCE(?, image), updated_at = ? WHERE id = ?",
        )
        .bind(hospital_id)
        .bind(department_id)
        .bind(&update.name)
        .bind(&update.specialization)
        .bind(&update.phone)
        .bind(&update.degree)
        .bind(&update.experience)
        .bind(update.fees)
        .bind(&update.image)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    /// Cascade delete: treatment records, appointments, account, doctor.
    pub async fn delete(&self, id: i64) -> DomainResult<()> {
        let doctor = self.get(id).await?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM treatment_records WHERE doctor_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM appointments WHERE doctor_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        AccountService::delete_account_in_tx(&mut tx, &doctor.account_id).await?;
        sqlx::query("DELETE FROM doctors WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(())
    }

    pub async fn set_image(&self, id: i64, image: Vec<u8>) -> DomainResult<()> {
        let result = sqlx::query("UPDATE doctors SET image = ?, updated_at = ? WHERE id = ?")
            .bind(image)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound("doctor"));
        }
        Ok(())
    }

    pub async fn get_image(&self, id: i64) -> DomainResult<Vec<u8>> {
        let doctor = self.get(id).await?;
        doctor.image.ok_or(DomainError::NotFound("doctor image"))
    }
}
