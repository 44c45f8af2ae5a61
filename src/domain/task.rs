use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::domain::catalog::RemoteProductRecord;

/// Units of work carried by the sync queue.
///
/// - `StartImport` is raised by the recurring timer or on demand.
/// - `RemoteRestart` is the delayed retry after the catalog was unreachable.
/// - `ImportProduct` upserts one remote record.
/// - `DeleteProduct` permanently removes the product with the given SKU.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum SyncTask {
    StartImport,
    RemoteRestart,
    ImportProduct(RemoteProductRecord),
    DeleteProduct(String),
}

/// Discriminant of a [`SyncTask`], used for logging and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    StartImport,
    RemoteRestart,
    ImportProduct,
    DeleteProduct,
}

impl SyncTask {
    pub fn kind(&self) -> TaskKind {
        match self {
            Self::StartImport => TaskKind::StartImport,
            Self::RemoteRestart => TaskKind::RemoteRestart,
            Self::ImportProduct(_) => TaskKind::ImportProduct,
            Self::DeleteProduct(_) => TaskKind::DeleteProduct,
        }
    }
}

impl TaskKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StartImport => "import_start",
            Self::RemoteRestart => "import_remote_restart",
            Self::ImportProduct => "import_product",
            Self::DeleteProduct => "delete_product",
        }
    }
}

impl Display for TaskKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
