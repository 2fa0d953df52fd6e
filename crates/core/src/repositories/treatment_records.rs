//! Treatment records and patient visibility.
//!
//! A record is 1:1 with its appointment (UNIQUE on `appointment_id`).
//! Creation inserts the record and repoints the parent appointment's
//! `treatment_record_id` in the same transaction — the back-reference is
//! never left dangling. Visibility starts hidden and is flipped by the
//! payment collaborator through `set_visibility`, which is idempotent.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::{DomainError, DomainResult};
use crate::models::{TreatmentRecord, TreatmentRecordDetails};

/// Fields the doctor submits when filing a record.
#[derive(Debug, Clone)]
pub struct NewTreatmentRecord {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_id: i64,
    pub treatment_date: DateTime<Utc>,
    pub description: String,
    pub visible_to_patient: bool,
}

const DETAILS_SELECT: &str = "SELECT tr.id, tr.patient_id, \
    p.first_name || ' ' || p.last_name AS patient_name, \
    tr.doctor_id, d.name AS doctor_name, tr.appointment_id, \
    tr.treatment_date, tr.description, tr.visible_to_patient, \
    tr.created_at, tr.updated_at \
    FROM treatment_records tr \
    JOIN patients p ON p.id = tr.patient_id \
    JOIN doctors d ON d.id = tr.doctor_id";

#[derive(Clone)]
pub struct TreatmentRecordService {
    pool: SqlitePool,
}

impl TreatmentRecordService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// File a treatment record for an appointment.
    ///
    /// Rejects future treatment dates, a missing appointment, and a
    /// second record for the same appointment (`DuplicateRecord`). The
    /// insert and the appointment back-reference update commit together.
    pub async fn create(&self, new: NewTreatmentRecord) -> DomainResult<TreatmentRecord> {
        if new.treatment_date > Utc::now() {
            return Err(DomainError::Validation(
                "treatment date cannot be in the future".into(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let appointment: Option<i64> =
            sqlx::query_scalar("SELECT id FROM appointments WHERE id = ?")
                .bind(new.appointment_id)
                .fetch_optional(&mut *tx)
                .await?;
        if appointment.is_none() {
            return Err(DomainError::NotFound("appointment"));
        }

        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM treatment_records WHERE appointment_id = ?")
                .bind(new.appointment_id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_some() {
            return Err(DomainError::DuplicateRecord(new.appointment_id));
        }

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO treatment_records \
             (patient_id, doctor_id, appointment_id, treatment_date, description, \
              visible_to_patient, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new.patient_id)
        .bind(new.doctor_id)
        .bind(new.appointment_id)
        .bind(new.treatment_date)
        .bind(&new.description)
        .bind(new.visible_to_patient)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            // UNIQUE backstop for a racing insert between the check above
            // and this statement.
            if DomainError::is_unique_violation(&e) {
                DomainError::DuplicateRecord(new.appointment_id)
            } else {
                e.into()
            }
        })?;

        let record_id = result.last_insert_rowid();

        sqlx::query("UPDATE appointments SET treatment_record_id = ?, updated_at = ? WHERE id = ?")
            .bind(record_id)
            .bind(now)
            .bind(new.appointment_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_row(record_id).await
    }

    pub async fn get_row(&self, id: i64) -> DomainResult<TreatmentRecord> {
        sqlx::query_as::<_, TreatmentRecord>("SELECT * FROM treatment_records WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DomainError::NotFound("treatment record"))
    }

    /// Fetch one record joined with patient and doctor names.
    pub async fn get(&self, id: i64) -> DomainResult<TreatmentRecordDetails> {
        let query = format!("{DETAILS_SELECT} WHERE tr.id = ?");
        sqlx::query_as::<_, TreatmentRecordDetails>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DomainError::NotFound("treatment record"))
    }

    pub async fn get_by_appointment(
        &self,
        appointment_id: i64,
    ) -> DomainResult<TreatmentRecordDetails> {
        let query = format!("{DETAILS_SELECT} WHERE tr.appointment_id = ?");
        sqlx::query_as::<_, TreatmentRecordDetails>(&query)
            .bind(appointment_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DomainError::NotFound("treatment record"))
    }

    /// Set the patient-visibility flag. Idempotent — re-setting the same
    /// value succeeds and changes nothing.
    pub async fn set_visibility(&self, id: i64, visible: bool) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE treatment_records SET visible_to_patient = ?, updated_at = ? WHERE id = ?",
        )
        .bind(visible)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound("treatment record"));
        }
        Ok(())
    }

    /// All records for a patient with `visible_to_patient = true`.
    pub async fn list_visible_for_patient(
        &self,
        patient_id: i64,
    ) -> DomainResult<Vec<TreatmentRecordDetails>> {
        let query = format!("{DETAILS_SELECT} WHERE tr.patient_id = ? AND tr.visible_to_patient = 1");
        let rows = sqlx::query_as::<_, TreatmentRecordDetails>(&query)
            .bind(patient_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::AppointmentStatus;
    use crate::repositories::appointments::{AppointmentService, NewAppointment};
    use chrono::{Duration, NaiveDate, NaiveTime};

    struct Fixture {
        pool: SqlitePool,
        records: TreatmentRecordService,
        appointments: AppointmentService,
        patient_id: i64,
        doctor_id: i64,
        appointment_id: i64,
    }

    async fn fixture() -> Fixture {
        let pool = db::connect_in_memory().await.expect("pool");
        let now = Utc::now();

        let patient = sqlx::query(
            "INSERT INTO patients (account_id, first_name, last_name, date_of_birth, gender, created_at, updated_at) \
             VALUES ('acc-p', 'Ada', 'Lovelace', '1990-01-01', 'female', ?, ?)",
        )
        .bind(now)
        .bind(now)
        .execute(&pool)
        .await
        .expect("patient inserted");

        let doctor = sqlx::query(
            "INSERT INTO doctors (account_id, hospital_id, department_id, name, is_available, created_at, updated_at) \
             VALUES ('acc-d', 1, 1, 'Dr Grace Hopper', 1, ?, ?)",
        )
        .bind(now)
        .bind(now)
        .execute(&pool)
        .await
        .expect("doctor inserted");

        let patient_id = patient.last_insert_rowid();
        let doctor_id = doctor.last_insert_rowid();

        let appointments = AppointmentService::new(pool.clone());
        let appointment = appointments
            .create(NewAppointment {
                patient_id,
                doctor_id,
                appointment_date: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date"),
                appointment_time: NaiveTime::from_hms_opt(10, 0, 0).expect("valid time"),
                reason: Some("checkup".into()),
                status: None,
            })
            .await
            .expect("appointment created");

        Fixture {
            records: TreatmentRecordService::new(pool.clone()),
            appointments,
            patient_id,
            doctor_id,
            appointment_id: appointment.id,
            pool,
        }
    }

    fn record_for(fx: &Fixture) -> NewTreatmentRecord {
        NewTreatmentRecord {
            patient_id: fx.patient_id,
            doctor_id: fx.doctor_id,
            appointment_id: fx.appointment_id,
            treatment_date: Utc::now() - Duration::hours(1),
            description: "routine examination".into(),
            visible_to_patient: false,
        }
    }

    #[tokio::test]
    async fn create_links_back_reference_in_same_operation() {
        let fx = fixture().await;

        let record = fx.records.create(record_for(&fx)).await.expect("created");
        assert!(!record.visible_to_patient);

        let appointment = fx
            .appointments
            .get_row(fx.appointment_id)
            .await
            .expect("appointment fetched");
        assert_eq!(appointment.treatment_record_id, record.id);
    }

    #[tokio::test]
    async fn future_treatment_date_is_rejected() {
        let fx = fixture().await;

        let mut new = record_for(&fx);
        new.treatment_date = Utc::now() + Duration::days(1);
        let err = fx.records.create(new).await.expect_err("future date");
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn second_record_for_appointment_is_a_duplicate() {
        let fx = fixture().await;

        let first = fx.records.create(record_for(&fx)).await.expect("first");
        let err = fx
            .records
            .create(record_for(&fx))
            .await
            .expect_err("duplicate");
        assert!(matches!(err, DomainError::DuplicateRecord(id) if id == fx.appointment_id));

        // First record unchanged by the failed attempt.
        let unchanged = fx.records.get_row(first.id).await.expect("still there");
        assert_eq!(unchanged.description, "routine examination");
        let appointment = fx
            .appointments
            .get_row(fx.appointment_id)
            .await
            .expect("appointment fetched");
        assert_eq!(appointment.treatment_record_id, first.id);
    }

    #[tokio::test]
    async fn missing_appointment_is_not_found() {
        let fx = fixture().await;

        let mut new = record_for(&fx);
        new.appointment_id = 9999;
        let err = fx.records.create(new).await.expect_err("no appointment");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn visibility_flip_is_idempotent() {
        let fx = fixture().await;
        let record = fx.records.create(record_for(&fx)).await.expect("created");

        fx.records
            .set_visibility(record.id, true)
            .await
            .expect("first flip");
        fx.records
            .set_visibility(record.id, true)
            .await
            .expect("second flip succeeds too");

        let row = fx.records.get_row(record.id).await.expect("fetched");
        assert!(row.visible_to_patient);

        let err = fx
            .records
            .set_visibility(9999, true)
            .await
            .expect_err("missing record");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn visible_listing_tracks_the_flag() {
        let fx = fixture().await;
        let record = fx.records.create(record_for(&fx)).await.expect("created");

        // Hidden record does not appear.
        let visible = fx
            .records
            .list_visible_for_patient(fx.patient_id)
            .await
            .expect("listed");
        assert!(visible.is_empty());

        fx.records
            .set_visibility(record.id, true)
            .await
            .expect("flipped");
        let visible = fx
            .records
            .list_visible_for_patient(fx.patient_id)
            .await
            .expect("listed");
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, record.id);
    }

    #[tokio::test]
    async fn deleting_appointment_removes_record_too() {
        let fx = fixture().await;
        fx.records.create(record_for(&fx)).await.expect("created");

        fx.appointments
            .delete(fx.appointment_id)
            .await
            .expect("deleted");

        let records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM treatment_records")
            .fetch_one(&fx.pool)
            .await
            .expect("count");
        assert_eq!(records, 0);
        let appointments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM appointments")
            .fetch_one(&fx.pool)
            .await
            .expect("count");
        assert_eq!(appointments, 0);
    }

    #[tokio::test]
    async fn scheduled_to_completed_to_filed_to_visible_scenario() {
        let fx = fixture().await;

        let appointment = fx
            .appointments
            .get_row(fx.appointment_id)
            .await
            .expect("fetched");
        assert_eq!(appointment.status, AppointmentStatus::Scheduled);
        assert_eq!(appointment.treatment_record_id, 0);

        fx.appointments
            .update_status(fx.appointment_id, AppointmentStatus::Completed)
            .await
            .expect("completed");

        let record = fx.records.create(record_for(&fx)).await.expect("filed");
        let appointment = fx
            .appointments
            .get_row(fx.appointment_id)
            .await
            .expect("fetched");
        assert_eq!(appointment.treatment_record_id, record.id);
        assert!(!record.visible_to_patient);

        fx.records
            .set_visibility(record.id, true)
            .await
            .expect("paid");
        let visible = fx
            .records
            .list_visible_for_patient(fx.patient_id)
            .await
            .expect("listed");
        assert!(visible.iter().any(|r| r.id == record.id));
    }
}
