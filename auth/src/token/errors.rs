use thiserror::Error;

/// Error type for token issuance and validation.
///
/// Variants stay distinguishable for internal logging; outward-facing
/// callers should collapse everything except `Expired` into a single opaque
/// "invalid token" response so validation failures leak nothing about which
/// check rejected the token.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Token is malformed: {0}")]
    Malformed(String),

    /// Signing algorithm in the token header is outside the expected family
    /// (including `none`); rejected before any claim is read.
    #[error("Token signing algorithm is not supported")]
    UnsupportedAlgorithm,
}
