//! Patient registration and profile endpoints.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use hospital_core::repositories::patients::{NewPatient, PatientPatch};

use crate::dto::{MessageRes, PatientGetDto, PatientPostDto, PatientUpdateDto};
use crate::error::{ApiError, ApiJson};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/patient", get(list).post(register))
        .route(
            "/api/patient/:id",
            get(get_by_id).patch(update).delete(delete),
        )
        .route("/api/patient/:id/image", get(get_image).post(upload_image))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<PatientGetDto>>, ApiError> {
    let rows = state.patients.list().await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PatientGetDto>, ApiError> {
    Ok(Json(state.patients.get(id).await?.into()))
}

/// Open registration: creates the login account with the `patient` role
/// and the profile row.
async fn register(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<PatientPostDto>,
) -> Result<(StatusCode, Json<PatientGetDto>), ApiError> {
    let patient = state
        .patients
        .register(NewPatient {
            email: dto.email,
            password: dto.password,
            first_name: dto.first_name,
            last_name: dto.last_name,
            date_of_birth: dto.date_of_birth,
            phone: dto.phone,
            gender: dto.gender,
            address: dto.address,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(patient.into())))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(dto): ApiJson<PatientUpdateDto>,
) -> Result<Json<MessageRes>, ApiError> {
    state
        .patients
        .patch(
            id,
            PatientPatch {
                first_name: dto.first_name,
                last_name: dto.last_name,
                date_of_birth: dto.date_of_birth,
                phone: dto.phone,
                email: dto.email,
                gender: dto.gender,
                address: dto.address,
            },
        )
        .await?;

    Ok(Json(MessageRes::new("Profile updated successfully.")))
}

/// Remove a patient and their history: treatment records, appointments,
/// and the login account go in the same transaction.
async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageRes>, ApiError> {
    state.patients.delete(id).await?;
    Ok(Json(MessageRes::new("Patient deleted successfully.")))
}

async fn upload_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<Json<MessageRes>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::Validation("no file uploaded".into()));
    }
    state.patients.set_image(id, body.to_vec()).await?;
    Ok(Json(MessageRes::new("Image uploaded successfully.")))
}

async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let image = state.patients.get_image(id).await?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], image))
}
