//! # Hospital Core
//!
//! Core business logic for the multi-hospital platform.
//!
//! This crate contains the relational schema, domain entities, and the
//! repository services the API surfaces call into:
//! - Appointment lifecycle (Scheduled → Completed | Cancelled)
//! - Treatment records with 1:1 appointment linkage and patient
//!   visibility gating
//! - Identity accounts, roles, and user-specific-id resolution
//! - Hospital / department / doctor / patient / admin directories
//!
//! **No API concerns**: HTTP servers, token handling, and authorization
//! policy belong in `api-rest` and `api-shared`.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repositories;

pub use config::AppConfig;
pub use error::{DomainError, DomainResult};
pub use repositories::accounts::AccountService;
pub use repositories::admins::AdminService;
pub use repositories::appointments::AppointmentService;
pub use repositories::departments::DepartmentService;
pub use repositories::doctors::DoctorService;
pub use repositories::hospitals::HospitalService;
pub use repositories::patients::PatientService;
pub use repositories::treatment_records::TreatmentRecordService;
