//! Declarative route authorization.
//!
//! A single middleware checks every request against a (method, route
//! template) → required-access table instead of per-handler guards. The
//! table is built next to the router, so the whole authorization surface
//! is readable in one place and restricting an endpoint is a one-line
//! change.

use std::sync::Arc;

use axum::extract::{MatchedPath, Request, State};
use axum::http::{header, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::auth::{AuthConfig, Claims};

/// Access requirement for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No token required. A valid bearer token, when present, still
    /// attaches an `AuthContext` for handlers that want it.
    Public,
    /// Any valid token.
    Authenticated,
    /// A valid token carrying the given role.
    Role(&'static str),
}

/// The verified caller, attached to the request extensions once the
/// policy admits it.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub account_id: String,
    pub roles: Vec<String>,
    pub user_specific_id: Option<i64>,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            account_id: claims.id,
            roles: claims.role,
            user_specific_id: claims
                .user_specific_id
                .and_then(|id| id.parse().ok()),
        }
    }
}

/// (method, route template) → `Access` table.
///
/// Routes not listed require `Authenticated` — the safe default for
/// anything added without a policy decision.
#[derive(Debug, Clone, Default)]
pub struct RoutePolicy {
    rules: Vec<(Method, &'static str, Access)>,
}

impl RoutePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, method: Method, template: &'static str, access: Access) -> Self {
        self.rules.push((method, template, access));
        self
    }

    pub fn access_for(&self, method: &Method, template: &str) -> Access {
        self.rules
            .iter()
            .find(|(m, t, _)| m == method && *t == template)
            .map(|(_, _, access)| *access)
            .unwrap_or(Access::Authenticated)
    }
}

/// State the enforcement middleware needs.
#[derive(Clone)]
pub struct PolicyState {
    pub policy: Arc<RoutePolicy>,
    pub auth: Arc<AuthConfig>,
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "message": message }))).into_response()
}

/// Policy enforcement middleware. Layer this on the API router.
pub async fn enforce(
    State(state): State<PolicyState>,
    mut req: Request,
    next: Next,
) -> Response {
    // The matched route template, e.g. "/api/appointment/:id/status".
    let template = req
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let access = state.policy.access_for(req.method(), &template);
    let claims = bearer_token(&req).and_then(|t| state.auth.verify(t).ok());

    match access {
        Access::Public => {}
        Access::Authenticated => {
            if claims.is_none() {
                return reject(StatusCode::UNAUTHORIZED, "missing or invalid token");
            }
        }
        Access::Role(role) => match &claims {
            None => return reject(StatusCode::UNAUTHORIZED, "missing or invalid token"),
            Some(claims) if !claims.has_role(role) => {
                return reject(StatusCode::FORBIDDEN, "insufficient permissions")
            }
            Some(_) => {}
        },
    }

    if let Some(claims) = claims {
        req.extensions_mut().insert(AuthContext::from(claims));
    }

    next.run(req).await
}
