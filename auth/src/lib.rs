//! Credential primitives for the CRM identity core
//!
//! Provides the store-agnostic building blocks of authentication:
//! - Password hashing (Argon2id)
//! - Access/refresh token issuance and validation (HS256)
//!
//! The `identity` crate composes these with its user repository; nothing in
//! here touches the database.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{TokenService, TokenType};
//!
//! let tokens = TokenService::new(b"secret_key_at_least_32_bytes_long!");
//! let token = tokens.issue_access_token("user123").unwrap();
//! let claims = tokens.validate(&token).unwrap();
//! assert_eq!(claims.sub, "user123");
//! assert_eq!(claims.typ, TokenType::Access);
//! ```

pub mod password;
pub mod token;

// Re-export commonly used items
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::TokenClaims;
pub use token::TokenError;
pub use token::TokenService;
pub use token::TokenType;
