/// Errors produced by core domain operations.
///
/// The variants map one-to-one onto the HTTP statuses the REST layer
/// returns: `Validation` → 400, `Unauthorized` → 401, `Forbidden` → 403,
/// `NotFound` → 404, `DuplicateRecord` → 409, everything else → 500.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("a treatment record already exists for appointment {0}")]
    DuplicateRecord(i64),
    #[error("invalid credentials")]
    Unauthorized,
    #[error("insufficient permissions")]
    Forbidden,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

impl DomainError {
    /// True when the error is a UNIQUE constraint violation. The
    /// treatment-record insert surfaces these as `DuplicateRecord`
    /// instead of a storage fault.
    pub fn is_unique_violation(err: &sqlx::Error) -> bool {
        matches!(err, sqlx::Error::Database(db) if db.message().contains("UNIQUE constraint failed"))
    }
}

pub type DomainResult<T> = std::result::Result<T, DomainError>;
