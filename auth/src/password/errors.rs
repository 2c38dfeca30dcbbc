use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Stored hash is not a parseable PHC string (wrong format or an
    /// algorithm this build does not support). Callers must present this to
    /// end users exactly like a mismatch.
    #[error("Stored password hash is invalid: {0}")]
    InvalidHash(String),
}
