//! # Foodshare - food donation dashboard
//!
//! Reporting and record management over a SQLite food-donation database.
//!
//! Foodshare provides:
//! - Typed records for providers, receivers, food listings and claims
//! - A single-connection storage handle with insert/update/delete per record type
//! - A fixed catalog of fifteen reporting queries
//! - Pure chart mapping from query results to render descriptions
//! - Dashboard aggregates, analytics charts and a JSON API

pub mod model;
pub mod storage;
pub mod report;
pub mod menu;
pub mod config;
pub mod output;
pub mod ui;
pub mod server;

// Re-exports for convenient access
pub use model::{Claim, ClaimStatus, EntityKind, FoodListing, FoodType, MealType, Provider, ProviderType, Receiver, ReceiverType};
pub use storage::FoodStore;
pub use report::{CatalogQuery, RenderSpec, ResultSet, Value};
pub use menu::MenuAction;

/// Result type alias for Foodshare operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Foodshare operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage unavailable at {path}: {source}")]
    StorageUnavailable {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: i64 },

    #[error("{entity} {id} has unreadable stored data: {reason}")]
    UnreadableRow {
        entity: EntityKind,
        id: i64,
        reason: String,
    },

    #[error("Query {query} failed: {source}")]
    QueryExecution {
        query: usize,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Chart error: {0}")]
    Chart(String),

    #[error("Storage error: {0}")]
    Storage(rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref code, ref message)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                let detail = message.clone().unwrap_or_else(|| code.to_string());
                Error::ConstraintViolation(detail)
            }
            other => Error::Storage(other),
        }
    }
}

impl Error {
    /// Whether the failure is reported to the user rather than aborting the process
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::StorageUnavailable { .. } | Error::Io(_))
    }
}
