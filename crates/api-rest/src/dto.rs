//! Request and response DTOs.
//!
//! Field names are camelCase on the wire, matching what the portal and
//! console clients submit. Image blobs travel as base64 strings inside
//! JSON; the dedicated image endpoints move raw bytes instead.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use hospital_core::models::{
    Admin, Appointment, AppointmentDetails, Department, Doctor, Hospital, Patient,
    TreatmentRecord, TreatmentRecordDetails,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;

pub(crate) fn encode_image(image: &Option<Vec<u8>>) -> Option<String> {
    image.as_ref().map(|bytes| BASE64.encode(bytes))
}

pub(crate) fn decode_image(image: Option<String>) -> Result<Option<Vec<u8>>, ApiError> {
    match image {
        None => Ok(None),
        Some(encoded) => BASE64
            .decode(encoded.as_bytes())
            .map(Some)
            .map_err(|_| ApiError::Validation("image is not valid base64".into())),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRes {
    pub message: String,
}

impl MessageRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Auth

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginDto {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenRes {
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUserRolesDto {
    pub email: String,
    pub roles: Vec<String>,
}

// ---------------------------------------------------------------------------
// Appointments

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPostDto {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub reason: Option<String>,
    /// Optional on create; booking always starts `Scheduled` when absent.
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentStatusUpdateDto {
    pub new_status: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentGetDto {
    pub appointment_id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub reason: Option<String>,
    pub status: String,
    pub treatment_record_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AppointmentDetails> for AppointmentGetDto {
    fn from(a: AppointmentDetails) -> Self {
        Self {
            appointment_id: a.id,
            patient_id: a.patient_id,
            patient_name: a.patient_name,
            doctor_id: a.doctor_id,
            doctor_name: a.doctor_name,
            appointment_date: a.appointment_date,
            appointment_time: a.appointment_time,
            reason: a.reason,
            status: a.status.to_string(),
            treatment_record_id: a.treatment_record_id,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

/// Row-shaped response used where no join is wanted (e.g. just-created).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRes {
    pub appointment_id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub reason: Option<String>,
    pub status: String,
    pub treatment_record_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Appointment> for AppointmentRes {
    fn from(a: Appointment) -> Self {
        Self {
            appointment_id: a.id,
            patient_id: a.patient_id,
            doctor_id: a.doctor_id,
            appointment_date: a.appointment_date,
            appointment_time: a.appointment_time,
            reason: a.reason,
            status: a.status.to_string(),
            treatment_record_id: a.treatment_record_id,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Treatment records

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentRecordPostDto {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_id: i64,
    pub treatment_date: DateTime<Utc>,
    pub description: String,
    /// Typically false initially; visibility is granted after payment.
    #[serde(default)]
    pub is_visible_to_patient: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityUpdateDto {
    pub is_visible_to_patient: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentRecordGetDto {
    pub treatment_record_id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub appointment_id: i64,
    pub treatment_date: DateTime<Utc>,
    pub description: String,
    pub is_visible_to_patient: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TreatmentRecordDetails> for TreatmentRecordGetDto {
    fn from(tr: TreatmentRecordDetails) -> Self {
        Self {
            treatment_record_id: tr.id,
            patient_id: tr.patient_id,
            patient_name: tr.patient_name,
            doctor_id: tr.doctor_id,
            doctor_name: tr.doctor_name,
            appointment_id: tr.appointment_id,
            treatment_date: tr.treatment_date,
            description: tr.description,
            is_visible_to_patient: tr.visible_to_patient,
            created_at: tr.created_at,
            updated_at: tr.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentRecordRes {
    pub treatment_record_id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_id: i64,
    pub treatment_date: DateTime<Utc>,
    pub description: String,
    pub is_visible_to_patient: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TreatmentRecord> for TreatmentRecordRes {
    fn from(tr: TreatmentRecord) -> Self {
        Self {
            treatment_record_id: tr.id,
            patient_id: tr.patient_id,
            doctor_id: tr.doctor_id,
            appointment_id: tr.appointment_id,
            treatment_date: tr.treatment_date,
            description: tr.description,
            is_visible_to_patient: tr.visible_to_patient,
            created_at: tr.created_at,
            updated_at: tr.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Hospitals

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalPostDto {
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalGetDto {
    pub hospital_id: i64,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Hospital> for HospitalGetDto {
    fn from(h: Hospital) -> Self {
        Self {
            hospital_id: h.id,
            name: h.name,
            address: h.address,
            phone: h.phone,
            email: h.email,
            image: encode_image(&h.image),
            created_at: h.created_at,
            updated_at: h.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Departments

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentPostDto {
    pub hospital_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentGetDto {
    pub department_id: i64,
    pub hospital_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Department> for DepartmentGetDto {
    fn from(d: Department) -> Self {
        Self {
            department_id: d.id,
            hospital_id: d.hospital_id,
            name: d.name,
            description: d.description,
            image: encode_image(&d.image),
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Doctors

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorCreationDto {
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
    #[serde(default)]
    pub is_available: bool,
    pub image: Option<String>,
}

/// Hospital/department ids default to 0, meaning "keep the current
/// assignment".
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorUpdateDto {
    #[serde(default)]
    pub hospital_id: i64,
    #[serde(default)]
    pub department_id: i64,
    pub name: String,
    pub specialization: Option<String>,
    pub phone: Option<String>,
    pub degree: Option<String>,
    pub experience: Option<String>,
    pub fees: Option<f64>,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorGetDto {
    pub doctor_id: i64,
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
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Doctor> for DoctorGetDto {
    fn from(d: Doctor) -> Self {
        Self {
            doctor_id: d.id,
            hospital_id: d.hospital_id,
            department_id: d.department_id,
            name: d.name,
            specialization: d.specialization,
            phone: d.phone,
            email: d.email,
            degree: d.degree,
            experience: d.experience,
            fees: d.fees,
            is_available: d.is_available,
            image: encode_image(&d.image),
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Patients

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientPostDto {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub phone: Option<String>,
    pub gender: String,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PatientUpdateDto {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientGetDto {
    pub patient_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gender: String,
    pub address: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Patient> for PatientGetDto {
    fn from(p: Patient) -> Self {
        Self {
            patient_id: p.id,
            first_name: p.first_name,
            last_name: p.last_name,
            date_of_birth: p.date_of_birth,
            phone: p.phone,
            email: p.email,
            gender: p.gender,
            address: p.address,
            image: encode_image(&p.image),
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Admins

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateDto {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminGetDto {
    pub admin_id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Admin> for AdminGetDto {
    fn from(a: Admin) -> Self {
        Self {
            admin_id: a.id,
            name: a.name,
            email: a.email,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}
