//! Domain entities mapped onto the relational schema.
//!
//! Rows deserialize straight into these structs via `sqlx::FromRow`;
//! column names match field names. Joined listing types (patient and
//! doctor names resolved) live alongside the entities they decorate.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Appointment lifecycle status.
///
/// `Scheduled` is the initial state; `Completed` and `Cancelled` are
/// terminal. Status updates accept any of the three values — the
/// transition set is deliberately not narrowed beyond the enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Parse a status name, case-insensitively.
    ///
    /// Returns `None` for anything outside the three defined values;
    /// callers surface that as a validation error.
    pub fn parse(input: &str) -> Option<Self> {
        match input.to_ascii_lowercase().as_str() {
            "scheduled" => Some(Self::Scheduled),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity account. Accounts hold credentials and roles; the domain
/// tables (patients, doctors, admins) link back to them by id.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Hospital {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(skip)]
    pub image: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Department {
    pub id: i64,
    pub hospital_id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(skip)]
    pub image: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Doctor {
    pub id: i64,
    pub account_id: String,
    pub hospital_id: i64,
    pub department_id: i64,
    pub name: String,
    pub specialization: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub degree: Option<String>,
    pub experience: Option<String>,
    pub fees: Option<f64>,
    pub is_available: bool,
    #[serde(skip)]
    pub image: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Patient {
    pub id: i64,
    pub account_id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gender: String,
    pub address: Option<String>,
    #[serde(skip)]
    pub image: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Admin {
    pub id: i64,
    pub account_id: Option<String>,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An appointment row.
///
/// `treatment_record_id` is 0 until the doctor files a treatment record;
/// any other value points at the unique record whose `appointment_id`
/// points back here.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub reason: Option<String>,
    pub status: AppointmentStatus,
    pub treatment_record_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Appointment joined with patient and doctor display names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AppointmentDetails {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub reason: Option<String>,
    pub status: AppointmentStatus,
    pub treatment_record_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TreatmentRecord {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_id: i64,
    pub treatment_date: DateTime<Utc>,
    pub description: String,
    pub visible_to_patient: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Treatment record joined with patient and doctor display names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TreatmentRecordDetails {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub appointment_id: i64,
    pub treatment_date: DateTime<Utc>,
    pub description: String,
    pub visible_to_patient: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_accepts_defined_values_case_insensitively() {
        assert_eq!(
            AppointmentStatus::parse("scheduled"),
            Some(AppointmentStatus::Scheduled)
        );
        assert_eq!(
            AppointmentStatus::parse("Completed"),
            Some(AppointmentStatus::Completed)
        );
        assert_eq!(
            AppointmentStatus::parse("CANCELLED"),
            Some(AppointmentStatus::Cancelled)
        );
    }

    #[test]
    fn status_parse_rejects_unknown_values() {
        assert_eq!(AppointmentStatus::parse("Pending"), None);
        assert_eq!(AppointmentStatus::parse(""), None);
    }
}
