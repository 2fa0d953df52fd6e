//! Department directory endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use hospital_core::repositories::departments::NewDepartment;

use crate::dto::{decode_image, DepartmentGetDto, DepartmentPostDto, DoctorGetDto, MessageRes};
use crate::error::{ApiError, ApiJson};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/department", get(list).post(create))
        .route(
            "/api/department/:id",
            get(get_by_id).put(update).delete(delete),
        )
        .route("/api/department/hospital/:hospital_id", get(list_by_hospital))
        .route("/api/department/:id/doctors", get(list_doctors))
}

fn to_new_department(dto: DepartmentPostDto) -> Result<NewDepartment, ApiError> {
    Ok(NewDepartment {
        hospital_id: dto.hospital_id,
        name: dto.name,
        description: dto.description,
        image: decode_image(dto.image)?,
    })
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<DepartmentGetDto>>, ApiError> {
    let rows = state.departments.list().await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DepartmentGetDto>, ApiError> {
    Ok(Json(state.departments.get(id).await?.into()))
}

async fn list_by_hospital(
    State(state): State<AppState>,
    Path(hospital_id): Path<i64>,
) -> Result<Json<Vec<DepartmentGetDto>>, ApiError> {
    let rows = state.departments.list_by_hospital(hospital_id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

async fn list_doctors(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<DoctorGetDto>>, ApiError> {
    let rows = state.departments.doctors(id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

async fn create(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<DepartmentPostDto>,
) -> Result<(StatusCode, Json<DepartmentGetDto>), ApiError> {
    let department = state.departments.create(to_new_department(dto)?).await?;
    Ok((StatusCode::CREATED, Json(department.into())))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(dto): ApiJson<DepartmentPostDto>,
) -> Result<Json<MessageRes>, ApiError> {
    state.departments.update(id, to_new_department(dto)?).await?;
    Ok(Json(MessageRes::new("Department updated successfully.")))
}

/// Deleting a department dissolves its roster: doctors, their
/// appointments, treatment records, and accounts go with it.
async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageRes>, ApiError> {
    state.departments.delete(id).await?;
    Ok(Json(MessageRes::new("Department deleted successfully.")))
}
