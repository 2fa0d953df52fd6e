//! # API REST
//!
//! REST API for the multi-hospital platform.
//!
//! Handles:
//! - HTTP endpoints with axum, one route module per aggregate
//! - Declarative route authorization via `api-shared`'s policy table
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS)

#![warn(rust_2018_idioms)]

pub mod dto;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::http::Method;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::policy::{enforce, Access, PolicyState, RoutePolicy};
use api_shared::{AuthConfig, HealthRes, HealthService};
use hospital_core::{
    AccountService, AdminService, AppointmentService, DepartmentService, DoctorService,
    HospitalService, PatientService, TreatmentRecordService,
};

/// Application state shared across REST handlers: one service per
/// aggregate plus the token configuration.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub admins: AdminService,
    pub appointments: AppointmentService,
    pub departments: DepartmentService,
    pub doctors: DoctorService,
    pub hospitals: HospitalService,
    pub patients: PatientService,
    pub records: TreatmentRecordService,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(pool: SqlitePool, auth: AuthConfig) -> Self {
        Self {
            accounts: AccountService::new(pool.clone()),
            admins: AdminService::new(pool.clone()),
            appointments: AppointmentService::new(pool.clone()),
            departments: DepartmentService::new(pool.clone()),
            doctors: DoctorService::new(pool.clone()),
            hospitals: HospitalService::new(pool.clone()),
            patients: PatientService::new(pool.clone()),
            records: TreatmentRecordService::new(pool),
            auth: Arc::new(auth),
        }
    }
}

/// The whole authorization surface, in one place.
///
/// Directory reads are public (the portal browses them before login),
/// registration is open, and everything else carries the role the
/// original console/portal split implies. Unlisted routes default to
/// `Authenticated`.
fn policy_table() -> RoutePolicy {
    use Access::{Authenticated, Public, Role};

    RoutePolicy::new()
        // auth
        .route(Method::POST, "/api/auth/login", Public)
        .route(Method::GET, "/api/auth/roles", Public)
        .route(Method::POST, "/api/auth/roles", Public)
        .route(Method::GET, "/api/auth/users/:email/roles", Public)
        .route(Method::POST, "/api/auth/user-roles", Public)
        // appointments
        .route(Method::GET, "/api/appointment", Authenticated)
        .route(Method::GET, "/api/appointment/:id", Authenticated)
        .route(Method::POST, "/api/appointment", Role("patient"))
        .route(Method::PUT, "/api/appointment/:id", Role("patient"))
        // Open in the original; restricting it is a one-line change here.
        .route(Method::PUT, "/api/appointment/:id/status", Public)
        .route(Method::DELETE, "/api/appointment/:id", Role("patient"))
        .route(Method::GET, "/api/appointment/doctor/:doctor_id", Authenticated)
        .route(Method::GET, "/api/appointment/patient/:patient_id", Authenticated)
        // treatment records
        .route(Method::POST, "/api/treatmentrecords", Role("doctor"))
        .route(Method::GET, "/api/treatmentrecords/:id", Authenticated)
        .route(
            Method::GET,
            "/api/treatmentrecords/appointment/:appointment_id",
            Authenticated,
        )
        .route(
            Method::PUT,
            "/api/treatmentrecords/:id/visibility",
            Authenticated,
        )
        .route(
            Method::GET,
            "/api/treatmentrecords/patient/:patient_id/visible",
            Authenticated,
        )
        // hospitals
        .route(Method::GET, "/api/hospital", Public)
        .route(Method::GET, "/api/hospital/:id", Public)
        .route(Method::POST, "/api/hospital", Role("admin"))
        .route(Method::PUT, "/api/hospital/:id", Role("admin"))
        .route(Method::DELETE, "/api/hospital/:id", Role("admin"))
        // departments
        .route(Method::GET, "/api/department", Public)
        .route(Method::GET, "/api/department/:id", Public)
        .route(Method::GET, "/api/department/hospital/:hospital_id", Public)
        .route(Method::GET, "/api/department/:id/doctors", Public)
        .route(Method::POST, "/api/department", Role("admin"))
        .route(Method::PUT, "/api/department/:id", Role("admin"))
        .route(Method::DELETE, "/api/department/:id", Role("admin"))
        // doctors
        .route(Method::GET, "/api/doctor", Public)
        .route(Method::GET, "/api/doctor/:id", Public)
        .route(Method::POST, "/api/doctor/register", Role("admin"))
        .route(Method::PUT, "/api/doctor/:id", Role("doctor"))
        .route(Method::DELETE, "/api/doctor/:id", Role("admin"))
        .route(Method::GET, "/api/doctor/:id/image", Public)
        .route(Method::POST, "/api/doctor/:id/image", Role("doctor"))
        // patients
        .route(Method::GET, "/api/patient", Authenticated)
        .route(Method::GET, "/api/patient/:id", Authenticated)
        .route(Method::POST, "/api/patient", Public)
        .route(Method::PATCH, "/api/patient/:id", Role("patient"))
        .route(Method::DELETE, "/api/patient/:id", Role("patient"))
        .route(Method::POST, "/api/patient/:id/image", Role("patient"))
        .route(Method::GET, "/api/patient/:id/image", Role("patient"))
        // admins
        .route(Method::GET, "/api/admin", Role("admin"))
        .route(Method::GET, "/api/admin/:id", Role("admin"))
        .route(Method::PUT, "/api/admin/:id", Role("admin"))
        .route(Method::DELETE, "/api/admin/:id", Role("admin"))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        routes::auth::login,
        routes::appointments::list,
        routes::appointments::get_by_id,
        routes::appointments::create,
        routes::appointments::update_status,
        routes::appointments::delete,
        routes::appointments::list_by_doctor,
        routes::appointments::list_by_patient,
        routes::treatment_records::create,
        routes::treatment_records::get_by_id,
        routes::treatment_records::get_by_appointment,
        routes::treatment_records::update_visibility,
        routes::treatment_records::list_visible,
    ),
    components(schemas(
        HealthRes,
        dto::LoginDto,
        dto::TokenRes,
        dto::AppointmentPostDto,
        dto::AppointmentStatusUpdateDto,
        dto::AppointmentGetDto,
        dto::AppointmentRes,
        dto::TreatmentRecordPostDto,
        dto::TreatmentRecordGetDto,
        dto::TreatmentRecordRes,
        dto::VisibilityUpdateDto,
    ))
)]
struct ApiDoc;

/// Build the application router: API routes behind the policy
/// middleware, plus health and Swagger UI.
pub fn app(pool: SqlitePool, auth: AuthConfig) -> Router {
    let state = AppState::new(pool, auth.clone());
    let policy = PolicyState {
        policy: Arc::new(policy_table()),
        auth: Arc::new(auth),
    };

    let api = Router::new()
        .merge(routes::admins::router())
        .merge(routes::appointments::router())
        .merge(routes::auth::router())
        .merge(routes::departments::router())
        .merge(routes::doctors::router())
        .merge(routes::hospitals::router())
        .merge(routes::patients::router())
        .merge(routes::treatment_records::router())
        .layer(axum::middleware::from_fn_with_state(policy, enforce))
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api)
        .layer(CorsLayer::permissive())
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Health check response", body = HealthRes))
)]
/// Health check endpoint, used for monitoring and load balancer probes.
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}
