//! Doctor roster endpoints.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use hospital_core::repositories::doctors::{DoctorUpdate, NewDoctor};

use crate::dto::{decode_image, DoctorCreationDto, DoctorGetDto, DoctorUpdateDto, MessageRes};
use crate::error::{ApiError, ApiJson};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/doctor", get(list))
        .route("/api/doctor/register", post(register))
        .route("/api/doctor/:id", get(get_by_id).put(update).delete(delete))
        .route("/api/doctor/:id/image", get(get_image).post(upload_image))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<DoctorGetDto>>, ApiError> {
    let rows = state.doctors.list().await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DoctorGetDto>, ApiError> {
    Ok(Json(state.doctors.get(id).await?.into()))
}

/// Register a doctor. Creates the login account with the `doctor` role
/// and the roster row.
async fn register(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<DoctorCreationDto>,
) -> Result<(StatusCode, Json<DoctorGetDto>), ApiError> {
    let doctor = state
        .doctors
        .register(NewDoctor {
            email: dto.email,
            password: dto.password,
            hospital_id: dto.hospital_id,
            department_id: dto.department_id,
            name: dto.name,
            specialization: dto.specialization,
            phone: dto.phone,
            degree: dto.degree,
            experience: dto.experience,
            fees: dto.fees,
            is_available: dto.is_available,
            image: decode_image(dto.image)?,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(doctor.into())))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(dto): ApiJson<DoctorUpdateDto>,
) -> Result<Json<DoctorGetDto>, ApiError> {
    let doctor = state
        .doctors
        .update(
            id,
            DoctorUpdate {
                hospital_id: dto.hospital_id,
                department_id: dto.department_id,
                name: dto.name,
                specialization: dto.specialization,
                phone: dto.phone,
                degree: dto.degree,
                experience: dto.experience,
                fees: dto.fees,
                image: decode_image(dto.image)?,
            },
        )
        .await?;

    Ok(Json(doctor.into()))
}

/// Remove a doctor and everything that hangs off them: treatment
/// records, appointments, and the login account.
async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageRes>, ApiError> {
    state.doctors.delete(id).await?;
    Ok(Json(MessageRes::new("Doctor deleted successfully.")))
}

async fn upload_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<Json<MessageRes>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::Validation("no file uploaded".into()));
    }
    state.doctors.set_image(id, body.to_vec()).await?;
    Ok(Json(MessageRes::new("Image uploaded successfully.")))
}

async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let image = state.doctors.get_image(id).await?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], image))
}
