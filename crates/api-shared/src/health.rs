use serde::Serialize;
use utoipa::ToSchema;

/// Health check response body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Simple health service shared by any API surface.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }

    /// Static health check — preferred, no instance needed.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "hospital api is alive".into(),
        }
    }
}
