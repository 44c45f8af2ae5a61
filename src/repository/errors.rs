use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Requested row does not exist.
    #[error("entity not found")]
    NotFound,
    /// A unique or foreign key constraint rejected the write.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    /// Stored data failed domain validation.
    #[error("validation error: {0}")]
    ValidationError(String),
    /// Could not obtain a pooled connection.
    #[error("connection error: {0}")]
    ConnectionError(String),
    /// Any other database failure.
    #[error("database error: {0}")]
    DatabaseError(String),
}

impl From<diesel::result::Error> for RepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match err {
            Error::NotFound => Self::NotFound,
            Error::DatabaseError(
                DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::ForeignKeyViolation,
                info,
            ) => Self::ConstraintViolation(info.message().to_string()),
            other => Self::DatabaseError(other.to_string()),
        }
    }
}

impl From<diesel::r2d2::PoolError> for RepositoryError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        Self::ConnectionError(err.to_string())
    }
}

/// Convenient alias for results returned from repository functions.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
