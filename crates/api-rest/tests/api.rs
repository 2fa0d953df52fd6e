//! End-to-end router tests.
//!
//! Each test boots the full router over an in-memory database, seeded
//! with the platform roles and the static admin, and drives it with
//! `tower::ServiceExt::oneshot` — no listener, real middleware.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use api_shared::AuthConfig;
use hospital_core::{db, AppConfig};

const SECRET: &str = "integration-test-secret";

async fn test_app() -> Router {
    let pool = db::connect_in_memory().await.expect("in-memory pool");
    let config = AppConfig::new(
        "127.0.0.1:0".into(),
        "sqlite::memory:".into(),
        SECRET.into(),
        "hospital-api".into(),
        "hospital-clients".into(),
        "admin@example.com".into(),
        "Admin@123".into(),
        "Static Admin".into(),
    )
    .expect("valid config");
    db::seed(&pool, &config).await.expect("seeded");

    let auth = AuthConfig::new(SECRET, "hospital-api", "hospital-clients");
    api_rest::app(pool, auth)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request built"),
        None => builder.body(Body::empty()).expect("request built"),
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request handled");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body read")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().expect("token present").to_string()
}

/// Register a patient and return (patient id, token).
async fn register_patient(app: &Router, email: &str) -> (i64, String) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/patient",
        None,
        Some(json!({
            "email": email,
            "password": "Pat1ent!pw",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "dateOfBirth": "1990-01-01",
            "gender": "female"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");
    let id = body["patientId"].as_i64().expect("patient id");
    (id, login(app, email, "Pat1ent!pw").await)
}

/// Register a doctor through the admin console and return
/// (doctor id, token).
async fn register_doctor(app: &Router, admin_token: &str, email: &str) -> (i64, String) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/doctor/register",
        Some(admin_token),
        Some(json!({
            "email": email,
            "password": "D0ctor!pw",
            "hospitalId": 1,
            "departmentId": 1,
            "name": "Dr Grace Hopper",
            "specialization": "Cardiology",
            "isAvailable": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "doctor register failed: {body}");
    let id = body["doctorId"].as_i64().expect("doctor id");
    (id, login(app, email, "D0ctor!pw").await)
}

async fn book_appointment(app: &Router, patient_token: &str, patient_id: i64, doctor_id: i64) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/appointment",
        Some(patient_token),
        Some(json!({
            "patientId": patient_id,
            "doctorId": doctor_id,
            "appointmentDate": "2025-01-01",
            "appointmentTime": "10:00:00",
            "reason": "checkup"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "booking failed: {body}");
    assert_eq!(body["status"], "Scheduled");
    assert_eq!(body["treatmentRecordId"], 0);
    body["appointmentId"].as_i64().expect("appointment id")
}

#[tokio::test]
async fn health_is_open() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = test_app().await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "admin@example.com", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn policy_gates_booking_by_role() {
    let app = test_app().await;
    let admin_token = login(&app, "admin@example.com", "Admin@123").await;

    let booking = json!({
        "patientId": 1,
        "doctorId": 1,
        "appointmentDate": "2025-01-01",
        "appointmentTime": "10:00:00"
    });

    // No token: 401.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/appointment",
        None,
        Some(booking.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Admin token lacks the patient role: 403.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/appointment",
        Some(&admin_token),
        Some(booking),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn directory_reads_are_public_but_writes_are_admin() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/hospital", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let hospital = json!({ "name": "St Mary", "address": "1 High St" });
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/hospital",
        None,
        Some(hospital.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let admin_token = login(&app, "admin@example.com", "Admin@123").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/hospital",
        Some(&admin_token),
        Some(hospital),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "St Mary");
}

#[tokio::test]
async fn empty_by_doctor_listing_is_a_success() {
    let app = test_app().await;
    let admin_token = login(&app, "admin@example.com", "Admin@123").await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/appointment/doctor/42",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn invalid_status_value_is_a_validation_error() {
    let app = test_app().await;
    let (patient_id, patient_token) = register_patient(&app, "ada@example.com").await;
    let admin_token = login(&app, "admin@example.com", "Admin@123").await;
    let (doctor_id, _) = register_doctor(&app, &admin_token, "grace@example.com").await;
    let appointment_id = book_appointment(&app, &patient_token, patient_id, doctor_id).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/appointment/{appointment_id}/status"),
        None,
        Some(json!({ "newStatus": "Postponed" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/appointment/9999/status",
        None,
        Some(json!({ "newStatus": "Completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn booking_with_missing_fields_is_a_validation_error() {
    let app = test_app().await;
    let (_, patient_token) = register_patient(&app, "ada@example.com").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/appointment",
        Some(&patient_token),
        Some(json!({ "patientId": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn full_treatment_lifecycle() {
    let app = test_app().await;
    let (patient_id, patient_token) = register_patient(&app, "ada@example.com").await;
    let admin_token = login(&app, "admin@example.com", "Admin@123").await;
    let (doctor_id, doctor_token) = register_doctor(&app, &admin_token, "grace@example.com").await;
    let appointment_id = book_appointment(&app, &patient_token, patient_id, doctor_id).await;

    // Appointment completes.
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/appointment/{appointment_id}/status"),
        None,
        Some(json!({ "newStatus": "Completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Doctor files the record; patients may not.
    let record = json!({
        "patientId": patient_id,
        "doctorId": doctor_id,
        "appointmentId": appointment_id,
        "treatmentDate": (Utc::now() - Duration::hours(1)).to_rfc3339(),
        "description": "routine examination"
    });
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/treatmentrecords",
        Some(&patient_token),
        Some(record.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/treatmentrecords",
        Some(&doctor_token),
        Some(record.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "filing failed: {body}");
    let record_id = body["treatmentRecordId"].as_i64().expect("record id");
    assert_eq!(body["isVisibleToPatient"], false);

    // Appointment now points back at the record.
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/appointment/{appointment_id}"),
        Some(&patient_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["treatmentRecordId"], record_id);

    // A second record for the same appointment conflicts.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/treatmentrecords",
        Some(&doctor_token),
        Some(record),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Future-dated treatment is rejected.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/treatmentrecords",
        Some(&doctor_token),
        Some(json!({
            "patientId": patient_id,
            "doctorId": doctor_id,
            "appointmentId": appointment_id + 1,
            "treatmentDate": (Utc::now() + Duration::days(1)).to_rfc3339(),
            "description": "time travel"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Hidden until paid.
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/treatmentrecords/patient/{patient_id}/visible"),
        Some(&patient_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    // Payment confirmation flips visibility; repeating it is fine.
    for _ in 0..2 {
        let (status, _) = send(
            &app,
            Method::PUT,
            &format!("/api/treatmentrecords/{record_id}/visibility"),
            Some(&patient_token),
            Some(json!({ "isVisibleToPatient": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/treatmentrecords/patient/{patient_id}/visible"),
        Some(&patient_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["treatmentRecordId"], record_id);

    // Cancelling the appointment removes the record with it.
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/appointment/{appointment_id}"),
        Some(&patient_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/treatmentrecords/appointment/{appointment_id}"),
        Some(&patient_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
