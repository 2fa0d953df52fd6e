use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_shared::AuthConfig;
use hospital_core::{db, AppConfig};

/// Main entry point for the hospital platform API.
///
/// Resolves configuration from the environment, opens the database pool,
/// applies the schema, seeds the platform roles and the static admin,
/// and serves the REST API.
///
/// # Environment Variables
/// - `HOSPITAL_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `DATABASE_URL`: SQLite connection string (default: "sqlite:hospital.db?mode=rwc")
/// - `JWT_SECRET`: HMAC-SHA256 signing key (required)
/// - `JWT_ISSUER` / `JWT_AUDIENCE`: token issuer and audience claims
/// - `SEED_ADMIN_EMAIL` / `SEED_ADMIN_PASSWORD` / `SEED_ADMIN_NAME`:
///   static admin seeded at startup
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hospital=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let pool = db::connect(config.database_url()).await?;
    db::seed(&pool, &config).await?;

    let auth = AuthConfig::new(
        config.jwt_secret(),
        config.jwt_issuer(),
        config.jwt_audience(),
    );
    let app = api_rest::app(pool, auth);

    tracing::info!("++ Starting hospital REST on {}", config.rest_addr());

    let listener = tokio::net::TcpListener::bind(config.rest_addr()).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
