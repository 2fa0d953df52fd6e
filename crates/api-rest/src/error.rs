//! HTTP error mapping.
//!
//! `DomainError` variants map onto the REST taxonomy: Validation → 400,
//! Unauthorized → 401, Forbidden → 403, NotFound → 404, DuplicateRecord
//! → 409, storage faults → 500. Bodies are `{ "message": ... }`
//! throughout; internal faults are logged and return a generic message.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hospital_core::DomainError;
use serde::de::DeserializeOwned;

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::Validation(msg),
            DomainError::Unauthorized => Self::Unauthorized("invalid credentials".into()),
            DomainError::Forbidden => Self::Forbidden("insufficient permissions".into()),
            DomainError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            DomainError::DuplicateRecord(id) => {
                Self::Conflict(format!("a treatment record already exists for appointment {id}"))
            }
            DomainError::Database(e) => Self::Internal(e.to_string()),
            DomainError::PasswordHash(e) => Self::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into())
            }
        };

        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}

/// JSON extractor that rejects malformed or incomplete bodies with a
/// 400 instead of axum's default 422.
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(match rejection {
                JsonRejection::JsonDataError(e) => ApiError::Validation(e.body_text()),
                JsonRejection::JsonSyntaxError(e) => ApiError::Validation(e.body_text()),
                other => ApiError::Validation(other.body_text()),
            }),
        }
    }
}
