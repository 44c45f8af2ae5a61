use thiserror::Error;

use crate::queue::QueueError;
use crate::repository::RepositoryError;

/// Generic error type used by service layer functions.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input failed domain validation.
    #[error("invalid input: {0}")]
    TypeConstraint(String),
    /// The product store rejected or failed an operation.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
    /// A task could not be handed to the queue.
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),
    /// The product store is not available; sync is disabled.
    #[error("product store unavailable")]
    Unavailable,
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
