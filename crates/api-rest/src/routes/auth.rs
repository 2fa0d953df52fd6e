//! Authentication and role management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use hospital_core::repositories::accounts::Role;

use crate::dto::{AddUserRolesDto, LoginDto, MessageRes, TokenRes};
use crate::error::{ApiError, ApiJson};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/roles", get(list_roles).post(add_roles))
        .route("/api/auth/users/:email/roles", get(user_roles))
        .route("/api/auth/user-roles", post(add_user_roles))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginDto,
    responses(
        (status = 200, description = "JWT issued", body = TokenRes),
        (status = 401, description = "Invalid credentials")
    )
)]
/// Issue a JWT from email and password.
///
/// The token embeds one role claim per assigned role and, when a
/// patient/doctor/admin row links back to the account, the
/// `userSpecificId` claim resolved in that precedence order.
pub(crate) async fn login(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<LoginDto>,
) -> Result<Json<TokenRes>, ApiError> {
    let account = state
        .accounts
        .verify_credentials(&dto.email, &dto.password)
        .await?;

    let roles = state.accounts.roles_for_account(&account.id).await?;
    let user_specific_id = state
        .accounts
        .resolve_user_specific_id(&account.id, &roles)
        .await?;

    let token = state
        .auth
        .issue(&account.id, &account.email, roles, user_specific_id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(TokenRes { token }))
}

async fn list_roles(State(state): State<AppState>) -> Result<Json<Vec<Role>>, ApiError> {
    Ok(Json(state.accounts.list_roles().await?))
}

async fn user_roles(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.accounts.roles_for_email(&email).await?))
}

async fn add_roles(
    State(state): State<AppState>,
    ApiJson(roles): ApiJson<Vec<String>>,
) -> Result<Json<Vec<String>>, ApiError> {
    if roles.is_empty() {
        return Err(ApiError::Validation("no roles provided".into()));
    }
    Ok(Json(state.accounts.add_roles(&roles).await?))
}

async fn add_user_roles(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<AddUserRolesDto>,
) -> Result<(StatusCode, Json<MessageRes>), ApiError> {
    if dto.email.is_empty() || dto.roles.is_empty() {
        return Err(ApiError::Validation("invalid input data".into()));
    }
    state.accounts.assign_roles(&dto.email, &dto.roles).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageRes::new("Roles added successfully.")),
    ))
}
