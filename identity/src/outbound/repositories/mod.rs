pub mod audit;
pub mod user;

pub use audit::PostgresAuditLog;
pub use user::PostgresUserRepository;

use crate::domain::errors::IdentityError;

/// Wrap a store failure with operation context.
///
/// Pool exhaustion, closed pools, and connection I/O failures become
/// `StoreUnavailable`; everything else is a `Database` error. Nothing is
/// retried here.
pub(crate) fn map_store_error(e: sqlx::Error, context: &str) -> IdentityError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            IdentityError::StoreUnavailable(format!("{}: {}", context, e))
        }
        e => IdentityError::Database(format!("{}: {}", context, e)),
    }
}
