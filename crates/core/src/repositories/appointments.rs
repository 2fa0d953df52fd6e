//! Appointment lifecycle operations.
//!
//! Appointments start `Scheduled` with no treatment record
//! (`treatment_record_id = 0`). Deleting an appointment removes its
//! treatment record first, then the appointment, inside one transaction.

use chrono::{NaiveDate, NaiveTime, Utc};
use sqlx::SqlitePool;

use crate::error::{DomainError, DomainResult};
use crate::models::{Appointment, AppointmentDetails, AppointmentStatus};

/// Fields required to book an appointment.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub reason: Option<String>,
    pub status: Option<AppointmentStatus>,
}

/// Fields a patient may rewrite on an existing appointment.
///
/// The treatment-record reference is deliberately absent: only the
/// treatment-record service moves it, when a record is filed.
#[derive(Debug, Clone)]
pub struct AppointmentUpdate {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub reason: Option<String>,
    pub status: AppointmentStatus,
}

const DETAILS_SELECT: &str = "SELECT a.id, a.patient_id, \
    p.first_name || ' ' || p.last_name AS patient_name, \
    a.doctor_id, d.name AS doctor_name, a.appointment_date, \
    a.appointment_time, a.reason, a.status, a.treatment_record_id, \
    a.created_at, a.updated_at \
    FROM appointments a \
    JOIN patients p ON p.id = a.patient_id \
    JOIN doctors d ON d.id = a.doctor_id";

#[derive(Clone)]
pub struct AppointmentService {
    pool: SqlitePool,
}

impl AppointmentService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Book an appointment. Status defaults to `Scheduled` and the
    /// treatment-record reference starts at 0 (none yet).
    pub async fn create(&self, new: NewAppointment) -> DomainResult<Appointment> {
        let now = Utc::now();
        let status = new.status.unwrap_or(AppointmentStatus::Scheduled);

        let result = sqlx::query(
            "INSERT INTO appointments \
             (patient_id, doctor_id, appointment_date, appointment_time, reason, status, \
              treatment_record_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(new.patient_id)
        .bind(new.doctor_id)
        .bind(new.appointment_date)
        .bind(new.appointment_time)
        .bind(&new.reason)
        .bind(status)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_row(result.last_insert_rowid()).await
    }

    pub async fn get_row(&self, id: i64) -> DomainResult<Appointment> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DomainError::NotFound("appointment"))
    }

    /// Fetch one appointment joined with patient and doctor names.
    pub async fn get(&self, id: i64) -> DomainResult<AppointmentDetails> {
        let query = format!("{DETAILS_SELECT} WHERE a.id = ?");
        sqlx::query_as::<_, AppointmentDetails>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DomainError::NotFound("appointment"))
    }

    pub async fn list(&self) -> DomainResult<Vec<AppointmentDetails>> {
        let rows = sqlx::query_as::<_, AppointmentDetails>(DETAILS_SELECT)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// All appointments for a doctor. An empty list is a successful,
    /// empty response — not an error.
    pub async fn list_by_doctor(&self, doctor_id: i64) -> DomainResult<Vec<AppointmentDetails>> {
        let query = format!("{DETAILS_SELECT} WHERE a.doctor_id = ?");
        let rows = sqlx::query_as::<_, AppointmentDetails>(&query)
            .bind(doctor_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// All appointments for a patient. Empty list semantics as above.
    pub async fn list_by_patient(&self, patient_id: i64) -> DomainResult<Vec<AppointmentDetails>> {
        let query = format!("{DETAILS_SELECT} WHERE a.patient_id = ?");
        let rows = sqlx::query_as::<_, AppointmentDetails>(&query)
            .bind(patient_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Rewrite an appointment's bookable fields. The treatment-record
    /// reference is never touched here.
    pub async fn update(&self, id: i64, update: AppointmentUpdate) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE appointments SET patient_id = ?, doctor_id = ?, appointment_date = ?, \
             appointment_time = ?, reason = ?, status = ?, updated_at = ? WHERE id = ?",
        )
        .bind(update.patient_id)
        .bind(update.doctor_id)
        .bind(update.appointment_date)
        .bind(update.appointment_time)
        .bind(&update.reason)
        .bind(update.status)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound("appointment"));
        }
        Ok(())
    }

    /// Transition the appointment status. All three enumerated values
    /// are accepted; value validation happens when the caller parses the
    /// incoming status name.
    pub async fn update_status(&self, id: i64, status: AppointmentStatus) -> DomainResult<()> {
        let result =
            sqlx::query("UPDATE appointments SET status = ?, updated_at = ? WHERE id = ?")
                .bind(status)
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound("appointment"));
        }
        Ok(())
    }

    /// Delete an appointment and, if present, its treatment record —
    /// record first, then appointment, in one transaction.
    pub async fn delete(&self, id: i64) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM appointments WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(DomainError::NotFound("appointment"));
        }

        sqlx::query("DELETE FROM treatment_records WHERE appointment_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM appointments WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    /// Insert a patient and a doctor so the joined queries have rows to
    /// resolve; returns (patient_id, doctor_id).
    async fn seed_people(pool: &SqlitePool) -> (i64, i64) {
        let now = Utc::now();
        let patient = sqlx::query(
            "INSERT INTO patients (account_id, first_name, last_name, date_of_birth, gender, created_at, updated_at) \
             VALUES ('acc-p', 'Ada', 'Lovelace', '1990-01-01', 'female', ?, ?)",
        )
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .expect("patient inserted");

        let doctor = sqlx::query(
            "INSERT INTO doctors (account_id, hospital_id, department_id, name, is_available, created_at, updated_at) \
             VALUES ('acc-d', 1, 1, 'Dr Grace Hopper', 1, ?, ?)",
        )
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .expect("doctor inserted");

        (patient.last_insert_rowid(), doctor.last_insert_rowid())
    }

    fn booking(patient_id: i64, doctor_id: i64) -> NewAppointment {
        NewAppointment {
            patient_id,
            doctor_id,
            appointment_date: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date"),
            appointment_time: NaiveTime::from_hms_opt(10, 0, 0).expect("valid time"),
            reason: Some("checkup".into()),
            status: None,
        }
    }

    #[tokio::test]
    async fn create_starts_scheduled_with_no_record() {
        let pool = db::connect_in_memory().await.expect("pool");
        let (patient_id, doctor_id) = seed_people(&pool).await;
        let service = AppointmentService::new(pool);

        let appointment = service
            .create(booking(patient_id, doctor_id))
            .await
            .expect("created");

        assert_eq!(appointment.status, AppointmentStatus::Scheduled);
        assert_eq!(appointment.treatment_record_id, 0);
    }

    #[tokio::test]
    async fn status_update_transitions_and_missing_id_is_not_found() {
        let pool = db::connect_in_memory().await.expect("pool");
        let (patient_id, doctor_id) = seed_people(&pool).await;
        let service = AppointmentService::new(pool);

        let appointment = service
            .create(booking(patient_id, doctor_id))
            .await
            .expect("created");

        service
            .update_status(appointment.id, AppointmentStatus::Completed)
            .await
            .expect("status updated");
        let updated = service.get_row(appointment.id).await.expect("fetched");
        assert_eq!(updated.status, AppointmentStatus::Completed);

        let err = service
            .update_status(9999, AppointmentStatus::Cancelled)
            .await
            .expect_err("missing appointment");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_without_record_removes_only_appointment() {
        let pool = db::connect_in_memory().await.expect("pool");
        let (patient_id, doctor_id) = seed_people(&pool).await;
        let service = AppointmentService::new(pool.clone());

        let appointment = service
            .create(booking(patient_id, doctor_id))
            .await
            .expect("created");
        service.delete(appointment.id).await.expect("deleted");

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM appointments")
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn listings_are_empty_not_errors() {
        let pool = db::connect_in_memory().await.expect("pool");
        let service = AppointmentService::new(pool);

        let by_doctor = service.list_by_doctor(42).await.expect("empty ok");
        assert!(by_doctor.is_empty());
        let by_patient = service.list_by_patient(42).await.expect("empty ok");
        assert!(by_patient.is_empty());
    }

    #[tokio::test]
    async fn update_rewrites_fields_but_not_record_reference() {
        let pool = db::connect_in_memory().await.expect("pool");
        let (patient_id, doctor_id) = seed_people(&pool).await;
        let service = AppointmentService::new(pool.clone());

        let appointment = service
            .create(booking(patient_id, doctor_id))
            .await
            .expect("created");

        // Simulate a filed record reference, then update the booking.
        sqlx::query("UPDATE appointments SET treatment_record_id = 7 WHERE id = ?")
            .bind(appointment.id)
            .execute(&pool)
            .await
            .expect("reference set");

        service
            .update(
                appointment.id,
                AppointmentUpdate {
                    patient_id,
                    doctor_id,
                    appointment_date: NaiveDate::from_ymd_opt(2025, 2, 2).expect("valid date"),
                    appointment_time: NaiveTime::from_hms_opt(9, 30, 0).expect("valid time"),
                    reason: Some("follow-up".into()),
                    status: AppointmentStatus::Scheduled,
                },
            )
            .await
            .expect("updated");

        let updated = service.get_row(appointment.id).await.expect("fetched");
        assert_eq!(updated.reason.as_deref(), Some("follow-up"));
        assert_eq!(updated.treatment_record_id, 7);
    }
}
