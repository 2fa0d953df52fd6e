//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into
//! services. Request handlers never read process-wide environment state,
//! which keeps behaviour consistent across multi-threaded runtimes and
//! test harnesses.

use crate::error::{DomainError, DomainResult};

/// Application configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    rest_addr: String,
    database_url: String,
    jwt_secret: String,
    jwt_issuer: String,
    jwt_audience: String,
    seed_admin_email: String,
    seed_admin_password: String,
    seed_admin_name: String,
}

impl AppConfig {
    /// Create a new `AppConfig`.
    ///
    /// Fails if the JWT secret is empty: an empty HMAC key would make
    /// every issued token forgeable.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rest_addr: String,
        database_url: String,
        jwt_secret: String,
        jwt_issuer: String,
        jwt_audience: String,
        seed_admin_email: String,
        seed_admin_password: String,
        seed_admin_name: String,
    ) -> DomainResult<Self> {
        if jwt_secret.trim().is_empty() {
            return Err(DomainError::Validation(
                "jwt_secret cannot be empty".into(),
            ));
        }

        Ok(Self {
            rest_addr,
            database_url,
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            seed_admin_email,
            seed_admin_password,
            seed_admin_name,
        })
    }

    /// Resolve configuration from the process environment.
    ///
    /// # Environment Variables
    /// - `HOSPITAL_REST_ADDR`: REST bind address (default: "0.0.0.0:3000")
    /// - `DATABASE_URL`: SQLite connection string (default: "sqlite:hospital.db?mode=rwc")
    /// - `JWT_SECRET`: HMAC-SHA256 signing key (required)
    /// - `JWT_ISSUER` / `JWT_AUDIENCE`: token issuer and audience
    /// - `SEED_ADMIN_EMAIL` / `SEED_ADMIN_PASSWORD` / `SEED_ADMIN_NAME`:
    ///   static admin seeded at startup
    pub fn from_env() -> DomainResult<Self> {
        let get = |key: &str, default: &str| {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| DomainError::Validation("JWT_SECRET is not set".into()))?;

        Self::new(
            get("HOSPITAL_REST_ADDR", "0.0.0.0:3000"),
            get("DATABASE_URL", "sqlite:hospital.db?mode=rwc"),
            jwt_secret,
            get("JWT_ISSUER", "hospital-api"),
            get("JWT_AUDIENCE", "hospital-clients"),
            get("SEED_ADMIN_EMAIL", "admin@example.com"),
            get("SEED_ADMIN_PASSWORD", "Admin@123"),
            get("SEED_ADMIN_NAME", "Static Admin"),
        )
    }

    pub fn rest_addr(&self) -> &str {
        &self.rest_addr
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn jwt_issuer(&self) -> &str {
        &self.jwt_issuer
    }

    pub fn jwt_audience(&self) -> &str {
        &self.jwt_audience
    }

    pub fn seed_admin_email(&self) -> &str {
        &self.seed_admin_email
    }

    pub fn seed_admin_password(&self) -> &str {
        &self.seed_admin_password
    }

    pub fn seed_admin_name(&self) -> &str {
        &self.seed_admin_name
    }
}
