//! Shared classification of Diesel and pool failures.
//!
//! Each repository adapter converts a [`StoreFault`] into its own port error
//! type, so connection problems and query problems keep distinct domain
//! mappings (service-unavailable vs internal) without leaking SQL detail.

use tracing::debug;

use super::pool::PoolError;

/// Adapter-internal failure category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreFault {
    /// The database could not be reached or a connection checkout failed.
    Connection(String),
    /// The statement itself failed.
    Query(String),
}

/// Classify a pool failure. Checkout and build failures are both
/// connectivity.
pub fn classify_pool_error(error: &PoolError) -> StoreFault {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            StoreFault::Connection(message.clone())
        }
    }
}

/// Classify a Diesel failure, logging the raw error at debug level.
///
/// Messages are generic on purpose; the SQL text and constraint names stay in
/// the logs.
pub fn classify_diesel_error(error: &diesel::result::Error) -> StoreFault {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            StoreFault::Connection("database connection closed".to_owned())
        }
        DieselError::DatabaseError(_, _) => StoreFault::Query("database error".to_owned()),
        DieselError::NotFound => StoreFault::Query("record not found".to_owned()),
        _ => StoreFault::Query("database error".to_owned()),
    }
}

/// Whether the error is a unique-constraint violation.
pub fn is_unique_violation(error: &diesel::result::Error) -> bool {
    matches!(
        error,
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _
        )
    )
}
