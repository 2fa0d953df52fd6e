//! Appointment endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use hospital_core::models::AppointmentStatus;
use hospital_core::repositories::appointments::{AppointmentUpdate, NewAppointment};

use crate::dto::{
    AppointmentGetDto, AppointmentPostDto, AppointmentRes, AppointmentStatusUpdateDto, MessageRes,
};
use crate::error::{ApiError, ApiJson};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/appointment", get(list).post(create))
        .route(
            "/api/appointment/:id",
            get(get_by_id).put(update).delete(delete),
        )
        .route("/api/appointment/:id/status", axum::routing::put(update_status))
        .route("/api/appointment/doctor/:doctor_id", get(list_by_doctor))
        .route("/api/appointment/patient/:patient_id", get(list_by_patient))
}

fn parse_status(input: &str) -> Result<AppointmentStatus, ApiError> {
    AppointmentStatus::parse(input)
        .ok_or_else(|| ApiError::Validation(format!("invalid appointment status: {input}")))
}

#[utoipa::path(
    get,
    path = "/api/appointment",
    responses((status = 200, description = "All appointments", body = [AppointmentGetDto]))
)]
pub(crate) async fn list(State(state): State<AppState>) -> Result<Json<Vec<AppointmentGetDto>>, ApiError> {
    let rows = state.appointments.list().await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/appointment/{id}",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "The appointment", body = AppointmentGetDto),
        (status = 404, description = "Unknown appointment")
    )
)]
pub(crate) async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AppointmentGetDto>, ApiError> {
    Ok(Json(state.appointments.get(id).await?.into()))
}

#[utoipa::path(
    post,
    path = "/api/appointment",
    request_body = AppointmentPostDto,
    responses(
        (status = 201, description = "Appointment booked", body = AppointmentRes),
        (status = 400, description = "Missing or malformed fields")
    )
)]
/// Book an appointment. Status starts `Scheduled` with no treatment
/// record attached yet.
pub(crate) async fn create(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<AppointmentPostDto>,
) -> Result<(StatusCode, Json<AppointmentRes>), ApiError> {
    let status = dto.status.as_deref().map(parse_status).transpose()?;

    let appointment = state
        .appointments
        .create(NewAppointment {
            patient_id: dto.patient_id,
            doctor_id: dto.doctor_id,
            appointment_date: dto.appointment_date,
            appointment_time: dto.appointment_time,
            reason: dto.reason,
            status,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(appointment.into())))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(dto): ApiJson<AppointmentPostDto>,
) -> Result<Json<MessageRes>, ApiError> {
    let status = dto
        .status
        .as_deref()
        .map(parse_status)
        .transpose()?
        .unwrap_or(AppointmentStatus::Scheduled);

    state
        .appointments
        .update(
            id,
            AppointmentUpdate {
                patient_id: dto.patient_id,
                doctor_id: dto.doctor_id,
                appointment_date: dto.appointment_date,
                appointment_time: dto.appointment_time,
                reason: dto.reason,
                status,
            },
        )
        .await?;

    Ok(Json(MessageRes::new("Appointment updated successfully.")))
}

#[utoipa::path(
    put,
    path = "/api/appointment/{id}/status",
    params(("id" = i64, Path, description = "Appointment id")),
    request_body = AppointmentStatusUpdateDto,
    responses(
        (status = 200, description = "Status transitioned"),
        (status = 400, description = "Value outside the enumeration"),
        (status = 404, description = "Unknown appointment")
    )
)]
/// Transition the appointment status. Any of the three enumerated
/// values is accepted.
pub(crate) async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(dto): ApiJson<AppointmentStatusUpdateDto>,
) -> Result<Json<MessageRes>, ApiError> {
    let status = parse_status(&dto.new_status)?;
    state.appointments.update_status(id, status).await?;
    Ok(Json(MessageRes::new(
        "Appointment status updated successfully.",
    )))
}

#[utoipa::path(
    delete,
    path = "/api/appointment/{id}",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment and any treatment record removed"),
        (status = 404, description = "Unknown appointment")
    )
)]
/// Cancel an appointment: its treatment record (if filed) goes first,
/// then the appointment, in one transaction.
pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageRes>, ApiError> {
    state.appointments.delete(id).await?;
    Ok(Json(MessageRes::new("Appointment deleted successfully.")))
}

#[utoipa::path(
    get,
    path = "/api/appointment/doctor/{doctor_id}",
    params(("doctor_id" = i64, Path, description = "Doctor id")),
    responses((status = 200, description = "Appointments for the doctor, possibly empty", body = [AppointmentGetDto]))
)]
pub(crate) async fn list_by_doctor(
    State(state): State<AppState>,
    Path(doctor_id): Path<i64>,
) -> Result<Json<Vec<AppointmentGetDto>>, ApiError> {
    let rows = state.appointments.list_by_doctor(doctor_id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/appointment/patient/{patient_id}",
    params(("patient_id" = i64, Path, description = "Patient id")),
    responses((status = 200, description = "Appointments for the patient, possibly empty", body = [AppointmentGetDto]))
)]
pub(crate) async fn list_by_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Vec<AppointmentGetDto>>, ApiError> {
    let rows = state.appointments.list_by_patient(patient_id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}
