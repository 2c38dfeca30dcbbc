use thiserror::Error;

use crate::domain::user::errors::RoleError;
use crate::domain::user::errors::UserIdError;
use crate::domain::user::errors::UsernameError;

/// Top-level error for all identity operations.
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Invalid role: {0}")]
    InvalidRole(#[from] RoleError),

    // Domain-level errors
    /// Entity absent or soft-deleted; the two cases are indistinguishable
    /// on purpose so callers cannot probe deletion state.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Username already taken: {0}")]
    DuplicateUsername(String),

    /// Deliberately merges "no such user" and "wrong password".
    #[error("Invalid credentials")]
    InvalidCredentials,

    // Infrastructure errors
    /// Pool exhaustion, connection failure, or timeout. Not retried here;
    /// retry policy belongs to the caller's transaction semantics.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The audit insert paired with a mutation failed; the mutation was
    /// rolled back with it.
    #[error("Audit write failed: {0}")]
    AuditWriteFailed(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for IdentityError {
    fn from(err: anyhow::Error) -> Self {
        IdentityError::Unknown(err.to_string())
    }
}
