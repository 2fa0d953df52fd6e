//! Admin roster endpoints.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use hospital_core::repositories::admins::AdminUpdate;

use crate::dto::{AdminGetDto, AdminUpdateDto, MessageRes};
use crate::error::{ApiError, ApiJson};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin", get(list))
        .route("/api/admin/:id", get(get_by_id).put(update).delete(delete))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<AdminGetDto>>, ApiError> {
    let rows = state.admins.list().await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AdminGetDto>, ApiError> {
    Ok(Json(state.admins.get(id).await?.into()))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(dto): ApiJson<AdminUpdateDto>,
) -> Result<Json<AdminGetDto>, ApiError> {
    let admin = state
        .admins
        .update(
            id,
            AdminUpdate {
                name: dto.name,
                email: dto.email,
            },
        )
        .await?;
    Ok(Json(admin.into()))
}

async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageRes>, ApiError> {
    state.admins.delete(id).await?;
    Ok(Json(MessageRes::new("Admin deleted successfully.")))
}
