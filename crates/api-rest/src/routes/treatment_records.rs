//! Treatment record endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use hospital_core::repositories::treatment_records::NewTreatmentRecord;

use crate::dto::{
    MessageRes, TreatmentRecordGetDto, TreatmentRecordPostDto, TreatmentRecordRes,
    VisibilityUpdateDto,
};
use crate::error::{ApiError, ApiJson};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/treatmentrecords", post(create))
        .route("/api/treatmentrecords/:id", get(get_by_id))
        .route("/api/treatmentrecords/:id/visibility", put(update_visibility))
        .route(
            "/api/treatmentrecords/appointment/:appointment_id",
            get(get_by_appointment),
        )
        .route(
            "/api/treatmentrecords/patient/:patient_id/visible",
            get(list_visible),
        )
}

#[utoipa::path(
    post,
    path = "/api/treatmentrecords",
    request_body = TreatmentRecordPostDto,
    responses(
        (status = 201, description = "Record filed and appointment linked", body = TreatmentRecordRes),
        (status = 400, description = "Future treatment date"),
        (status = 404, description = "Unknown appointment"),
        (status = 409, description = "A record already exists for the appointment")
    )
)]
/// File a treatment record. The insert and the parent appointment's
/// back-reference update commit together.
pub(crate) async fn create(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<TreatmentRecordPostDto>,
) -> Result<(StatusCode, Json<TreatmentRecordRes>), ApiError> {
    let record = state
        .records
        .create(NewTreatmentRecord {
            patient_id: dto.patient_id,
            doctor_id: dto.doctor_id,
            appointment_id: dto.appointment_id,
            treatment_date: dto.treatment_date,
            description: dto.description,
            visible_to_patient: dto.is_visible_to_patient,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(record.into())))
}

#[utoipa::path(
    get,
    path = "/api/treatmentrecords/{id}",
    params(("id" = i64, Path, description = "Treatment record id")),
    responses(
        (status = 200, description = "The record", body = TreatmentRecordGetDto),
        (status = 404, description = "Unknown record")
    )
)]
pub(crate) async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TreatmentRecordGetDto>, ApiError> {
    Ok(Json(state.records.get(id).await?.into()))
}

#[utoipa::path(
    get,
    path = "/api/treatmentrecords/appointment/{appointment_id}",
    params(("appointment_id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "The appointment's record", body = TreatmentRecordGetDto),
        (status = 404, description = "No record for this appointment")
    )
)]
pub(crate) async fn get_by_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<TreatmentRecordGetDto>, ApiError> {
    Ok(Json(
        state.records.get_by_appointment(appointment_id).await?.into(),
    ))
}

#[utoipa::path(
    put,
    path = "/api/treatmentrecords/{id}/visibility",
    params(("id" = i64, Path, description = "Treatment record id")),
    request_body = VisibilityUpdateDto,
    responses(
        (status = 200, description = "Visibility set (idempotent)"),
        (status = 404, description = "Unknown record")
    )
)]
/// Set the patient-visibility flag. The payment collaborator calls this
/// with `true` after confirming payment; repeating a value is not an
/// error.
pub(crate) async fn update_visibility(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(dto): ApiJson<VisibilityUpdateDto>,
) -> Result<Json<MessageRes>, ApiError> {
    state
        .records
        .set_visibility(id, dto.is_visible_to_patient)
        .await?;
    Ok(Json(MessageRes::new("Visibility updated successfully.")))
}

#[utoipa::path(
    get,
    path = "/api/treatmentrecords/patient/{patient_id}/visible",
    params(("patient_id" = i64, Path, description = "Patient id")),
    responses((status = 200, description = "Visible records for the patient, possibly empty", body = [TreatmentRecordGetDto]))
)]
pub(crate) async fn list_visible(
    State(state): State<AppState>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Vec<TreatmentRecordGetDto>>, ApiError> {
    let rows = state.records.list_visible_for_patient(patient_id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}
