//! Sync business logic.
//!
//! Every function is generic over the repository, queue and network seams so
//! it can be driven by the in-memory fakes in [`test`].

use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::domain::types::{CategoryId, ProductId};

pub mod catalog;
pub mod deletion;
pub mod dispatch;
pub mod errors;
pub mod events;
pub mod images;
pub mod main;
pub mod sync;
pub mod upsert;


pub use errors::{ServiceError, ServiceResult};

/// Values shared by the sync handlers.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Category every synced product is filed under.
    pub category_id: CategoryId,
    /// Delay before retrying after the catalog was unreachable.
    pub restart_remote_after: Duration,
}

/// What a handled task ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// A fetch was reconciled into product upserts and deletions.
    Dispatched { upserts: usize, deletions: usize },
    /// The catalog answered with nothing usable.
    NothingToImport,
    /// The catalog was unreachable; an import restart is scheduled.
    RetryScheduled(DateTime<Utc>),
    Created(ProductId),
    Updated(ProductId),
    Deleted(ProductId),
    /// The task had nothing to act on.
    Skipped(&'static str),
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskOutcome::Dispatched { upserts, deletions } => {
                write!(f, "dispatched {upserts} upserts and {deletions} deletions")
            }
            TaskOutcome::NothingToImport => f.write_str("nothing to import"),
            TaskOutcome::RetryScheduled(at) => write!(f, "retry scheduled at {at}"),
            TaskOutcome::Created(id) => write!(f, "created product {id}"),
            TaskOutcome::Updated(id) => write!(f, "updated product {id}"),
            TaskOutcome::Deleted(id) => write!(f, "deleted product {id}"),
            TaskOutcome::Skipped(reason) => write!(f, "skipped: {reason}"),
        }
    }
}
