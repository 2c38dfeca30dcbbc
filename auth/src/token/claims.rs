use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Purpose tag carried in the `typ` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Access => write!(f, "access"),
            TokenType::Refresh => write!(f, "refresh"),
        }
    }
}

/// Closed claims set for CRM bearer tokens.
///
/// Every field is required; decoding rejects tokens with missing or unknown
/// fields instead of carrying an open claims bag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TokenClaims {
    /// Subject: the user id the token was issued for.
    pub sub: String,

    /// Expiration time (Unix timestamp, seconds).
    pub exp: i64,

    /// Issued at (Unix timestamp, seconds).
    pub iat: i64,

    /// Token purpose.
    pub typ: TokenType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typ_serializes_lowercase() {
        let claims = TokenClaims {
            sub: "user123".to_string(),
            exp: 2000,
            iat: 1000,
            typ: TokenType::Refresh,
        };

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["typ"], "refresh");
        assert_eq!(json["sub"], "user123");
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let json = r#"{"sub":"u","exp":1,"iat":0,"typ":"access","role":"admin"}"#;
        assert!(serde_json::from_str::<TokenClaims>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_missing_typ() {
        let json = r#"{"sub":"u","exp":1,"iat":0}"#;
        assert!(serde_json::from_str::<TokenClaims>(json).is_err());
    }
}
