//! Hospital directory endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use hospital_core::repositories::hospitals::NewHospital;

use crate::dto::{decode_image, HospitalGetDto, HospitalPostDto, MessageRes};
use crate::error::{ApiError, ApiJson};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/hospital", get(list).post(create))
        .route(
            "/api/hospital/:id",
            get(get_by_id).put(update).delete(delete),
        )
}

fn to_new_hospital(dto: HospitalPostDto) -> Result<NewHospital, ApiError> {
    Ok(NewHospital {
        name: dto.name,
        address: dto.address,
        phone: dto.phone,
        email: dto.email,
        image: decode_image(dto.image)?,
    })
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<HospitalGetDto>>, ApiError> {
    let rows = state.hospitals.list().await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<HospitalGetDto>, ApiError> {
    Ok(Json(state.hospitals.get(id).await?.into()))
}

async fn create(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<HospitalPostDto>,
) -> Result<(StatusCode, Json<HospitalGetDto>), ApiError> {
    let hospital = state.hospitals.create(to_new_hospital(dto)?).await?;
    Ok((StatusCode::CREATED, Json(hospital.into())))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(dto): ApiJson<HospitalPostDto>,
) -> Result<Json<MessageRes>, ApiError> {
    state.hospitals.update(id, to_new_hospital(dto)?).await?;
    Ok(Json(MessageRes::new("Hospital updated successfully.")))
}

async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageRes>, ApiError> {
    state.hospitals.delete(id).await?;
    Ok(Json(MessageRes::new("Hospital deleted successfully.")))
}
