//! Patient registration and profile management.
//!
//! Registration is open: it creates the login account (with the
//! `patient` role) and the profile row. Deleting a patient removes their
//! treatment records, appointments, account, and profile in one
//! transaction.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::error::{DomainError, DomainResult};
use crate::models::Patient;
use crate::repositories::accounts::AccountService;

#[derive(Debug, Clone)]
pub struct NewPatient {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub phone: Option<String>,
    pub gender: String,
    pub address: Option<String>,
}

/// Partial profile update — only provided fields change.
#[derive(Debug, Clone, Default)]
pub struct PatientPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
}

#[derive(Clone)]
pub struct PatientService {
    pool: SqlitePool,
    accounts: AccountService,
}

impl PatientService {
    pub fn new(pool: SqlitePool) -> Self {
        let accounts = AccountService::new(pool.clone());
        Self { pool, accounts }
    }

    pub async fn register(&self, new: NewPatient) -> DomainResult<Patient> {
        let account_id = self
            .accounts
            .create_account(&new.email, &new.password, "patient")
            .await?;

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO patients \
             (account_id, first_name, last_name, date_of_birth, phone, email, gender, address, \
              created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&account_id)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.date_of_birth)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(&new.gender)
        .bind(&new.address)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(result.last_insert_rowid()).await
    }

    pub async fn get(&self, id: i64) -> DomainResult<Patient> {
        sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DomainError::NotFound("patient"))
    }

    pub async fn list(&self) -> DomainResult<Vec<Patient>> {
        let rows = sqlx::query_as::<_, Patient>("SELECT * FROM patients ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn patch(&self, id: i64, patch: PatientPatch) -> DomainResult<Patient> {
        let current = self.get(id).await?;

        sqlx::query(
            "UPDATE patients SET first_name = ?, last_name = ?, date_of_birth = ?, phone = ?, \
             email = ?, gender = ?, address = ?, updated_at = ? WHERE id = ?",
        )
        .bind(patch.first_name.unwrap_or(current.first_name))
        .bind(patch.last_name.unwrap_or(current.last_name))
        .bind(patch.date_of_birth.unwrap_or(current.date_of_birth))
        .bind(patch.phone.or(current.phone))
        .bind(patch.email.or(current.email))
        .bind(patch.gender.unwrap_or(current.gender))
        .bind(patch.address.or(current.address))
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    /// Cascade delete: treatment records, appointments, account, patient.
    pub async fn delete(&self, id: i64) -> DomainResult<()> {
        let patient = self.get(id).await?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM treatment_records WHERE patient_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM appointments WHERE patient_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        AccountService::delete_account_in_tx(&mut tx, &patient.account_id).await?;
        sqlx::query("DELETE FROM patients WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(())
    }

    pub async fn set_image(&self, id: i64, image: Vec<u8>) -> DomainResult<()> {
        let result = sqlx::query("UPDATE patients SET image = ?, updated_at = ? WHERE id = ?")
            .bind(image)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound("patient"));
        }
        Ok(())
    }

    pub async fn get_image(&self, id: i64) -> DomainResult<Vec<u8>> {
        let patient = self.get(id).await?;
        patient.image.ok_or(DomainError::NotFound("patient image"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn new_patient(email: &str) -> NewPatient {
        NewPatient {
            email: email.into(),
            password: "Pat1ent!pw".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).expect("valid date"),
            phone: Some("0123".into()),
            gender: "female".into(),
            address: None,
        }
    }

    #[tokio::test]
    async fn register_links_account_and_role() {
        let pool = db::connect_in_memory().await.expect("pool");
        let service = PatientService::new(pool.clone());

        let patient = service
            .register(new_patient("ada@example.com"))
            .await
            .expect("registered");

        let roles = AccountService::new(pool)
            .roles_for_account(&patient.account_id)
            .await
            .expect("roles");
        assert_eq!(roles, vec!["patient".to_string()]);
    }

    #[tokio::test]
    async fn patch_changes_only_provided_fields() {
        let pool = db::connect_in_memory().await.expect("pool");
        let service = PatientService::new(pool);
        let patient = service
            .register(new_patient("ada@example.com"))
            .await
            .expect("registered");

        let patched = service
            .patch(
                patient.id,
                PatientPatch {
                    address: Some("2 Analytical Way".into()),
                    ..Default::default()
                },
            )
            .await
            .expect("patched");

        assert_eq!(patched.first_name, "Ada");
        assert_eq!(patched.address.as_deref(), Some("2 Analytical Way"));
        assert_eq!(patched.phone.as_deref(), Some("0123"));
    }

    #[tokio::test]
    async fn delete_cascades_history_and_account() {
        let pool = db::connect_in_memory().await.expect("pool");
        let service = PatientService::new(pool.clone());
        let patient = service
            .register(new_patient("ada@example.com"))
            .await
            .expect("registered");

        let now = Utc::now();
        sqlx::query(
            "INSERT INTO appointments (patient_id, doctor_id, appointment_date, appointment_time, \
             status, treatment_record_id, created_at, updated_at) \
             VALUES (?, 1, '2025-01-01', '10:00:00', 'Completed', 0, ?, ?)",
        )
        .bind(patient.id)
        .bind(now)
        .bind(now)
        .execute(&pool)
        .await
        .expect("appointment");
        sqlx::query(
            "INSERT INTO treatment_records (patient_id, doctor_id, appointment_id, treatment_date, \
             description, visible_to_patient, created_at, updated_at) \
             VALUES (?, 1, 1, ?, 'exam', 0, ?, ?)",
        )
        .bind(patient.id)
        .bind(now)
        .bind(now)
        .bind(now)
        .execute(&pool)
        .await
        .expect("record");

        service.delete(patient.id).await.expect("deleted");

        for table in ["patients", "appointments", "treatment_records", "accounts"] {
            let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
                .fetch_one(&pool)
                .await
                .expect("count");
            assert_eq!(count, 0, "{table} should be empty");
        }
    }
}
