//! Database pool, schema, and startup seeding.
//!
//! The schema is applied with `CREATE TABLE IF NOT EXISTS` at boot; there
//! is no migration tooling. Cascade behaviour is not delegated to the
//! database — dependent rows are deleted explicitly, child before parent,
//! inside the owning transaction, so the contract stays visible and
//! testable.

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::error::DomainResult;
use crate::repositories::accounts::AccountService;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id            TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS roles (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS account_roles (
    account_id TEXT NOT NULL,
    role_id    INTEGER NOT NULL,
    UNIQUE (account_id, role_id)
);

CREATE TABLE IF NOT EXISTS hospitals (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT NOT NULL,
    address    TEXT NOT NULL,
    phone      TEXT,
    email      TEXT,
    image      BLOB,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS departments (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    hospital_id INTEGER NOT NULL,
    name        TEXT NOT NULL,
    description TEXT,
    image       BLOB,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS doctors (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    account_id     TEXT NOT NULL,
    hospital_id    INTEGER NOT NULL,
    department_id  INTEGER NOT NULL,
    name           TEXT NOT NULL,
    specialization TEXT,
    phone          TEXT,
    email          TEXT,
    degree         TEXT,
    experience     TEXT,
    fees           REAL,
    is_available   INTEGER NOT NULL DEFAULT 0,
    image          BLOB,
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS patients (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    account_id    TEXT NOT NULL,
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    date_of_birth TEXT NOT NULL,
    phone         TEXT,
    email         TEXT,
    gender        TEXT NOT NULL,
    address       TEXT,
    image         BLOB,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS admins (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    account_id TEXT,
    name       TEXT NOT NULL,
    email      TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS appointments (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    patient_id          INTEGER NOT NULL,
    doctor_id           INTEGER NOT NULL,
    appointment_date    TEXT NOT NULL,
    appointment_time    TEXT NOT NULL,
    reason              TEXT,
    status              TEXT NOT NULL DEFAULT 'Scheduled',
    treatment_record_id INTEGER NOT NULL DEFAULT 0,
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS treatment_records (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    patient_id         INTEGER NOT NULL,
    doctor_id          INTEGER NOT NULL,
    appointment_id     INTEGER NOT NULL UNIQUE,
    treatment_date     TEXT NOT NULL,
    description        TEXT NOT NULL,
    visible_to_patient INTEGER NOT NULL DEFAULT 0,
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL
);
"#;

/// Open a pool against the configured database and apply the schema.
pub async fn connect(database_url: &str) -> DomainResult<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    apply_schema(&pool).await?;
    Ok(pool)
}

/// Open an in-memory database for tests.
///
/// A single connection is used: each SQLite `:memory:` connection is its
/// own database, so a wider pool would hand out empty databases.
pub async fn connect_in_memory() -> DomainResult<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    apply_schema(&pool).await?;
    Ok(pool)
}

async fn apply_schema(pool: &SqlitePool) -> DomainResult<()> {
    for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Seed the three platform roles and the static admin account.
///
/// Idempotent: an existing admin account is left untouched.
pub async fn seed(pool: &SqlitePool, config: &AppConfig) -> DomainResult<()> {
    let accounts = AccountService::new(pool.clone());

    for role in ["patient", "doctor", "admin"] {
        accounts.ensure_role(role).await?;
    }

    if accounts
        .find_by_email(config.seed_admin_email())
        .await?
        .is_none()
    {
        let account_id = accounts
            .create_account(
                config.seed_admin_email(),
                config.seed_admin_password(),
                "admin",
            )
            .await?;

        let now = chrono::Utc::now();
        sqlx::query(
            "INSERT INTO admins (account_id, name, email, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&account_id)
        .bind(config.seed_admin_name())
        .bind(config.seed_admin_email())
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        tracing::info!("seeded admin account {}", config.seed_admin_email());
    }

    Ok(())
}
