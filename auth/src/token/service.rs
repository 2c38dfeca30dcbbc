use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::TokenClaims;
use super::claims::TokenType;
use super::errors::TokenError;

/// Default access token lifetime: 12 hours.
pub const DEFAULT_ACCESS_TTL_HOURS: i64 = 12;

/// Default refresh token lifetime: 7 days.
pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 7;

/// Stateless issuer/validator for access and refresh tokens.
///
/// Signs with a single symmetric key (HS256). No server-side state backs a
/// live token: a validly signed, non-expired token is always accepted. There
/// is no revocation list, so access TTLs should stay short.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    /// Create a token service with the default TTLs (12 h access, 7 d refresh).
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self::with_ttls(
            secret,
            Duration::hours(DEFAULT_ACCESS_TTL_HOURS),
            Duration::days(DEFAULT_REFRESH_TTL_DAYS),
        )
    }

    /// Create a token service with explicit TTLs.
    pub fn with_ttls(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Issue a signed access token for `user_id`.
    ///
    /// Claims: `sub = user_id`, `iat = now`, `exp = now + access TTL`,
    /// `typ = "access"`.
    ///
    /// # Errors
    /// * `EncodingFailed` - signing failed
    pub fn issue_access_token(&self, user_id: &str) -> Result<String, TokenError> {
        self.issue(user_id, TokenType::Access, self.access_ttl)
    }

    /// Issue a signed refresh token for `user_id`.
    ///
    /// Same shape as an access token with `typ = "refresh"` and the refresh
    /// TTL.
    ///
    /// # Errors
    /// * `EncodingFailed` - signing failed
    pub fn issue_refresh_token(&self, user_id: &str) -> Result<String, TokenError> {
        self.issue(user_id, TokenType::Refresh, self.refresh_ttl)
    }

    fn issue(&self, user_id: &str, typ: TokenType, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: user_id.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            typ,
        };

        let header = Header::new(self.algorithm);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Verify a token and decode its claims.
    ///
    /// The signature is checked before any claim is trusted. Tokens whose
    /// header names any algorithm other than HS256 (including `none`) are
    /// rejected, as are expired tokens and payloads that do not match the
    /// closed [`TokenClaims`] shape exactly.
    ///
    /// # Errors
    /// * `InvalidSignature` - signature does not verify under the configured key
    /// * `Expired` - token is past its `exp` claim
    /// * `UnsupportedAlgorithm` - header `alg` is outside the expected family
    /// * `Malformed` - not a valid compact JWT, or claims missing/unknown fields
    pub fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data =
            decode::<TokenClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                    ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                        TokenError::UnsupportedAlgorithm
                    }
                    _ => TokenError::Malformed(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    #[test]
    fn test_access_token_round_trip() {
        let service = TokenService::new(SECRET);

        let token = service.issue_access_token("user123").unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.typ, TokenType::Access);
        assert_eq!(claims.exp - claims.iat, DEFAULT_ACCESS_TTL_HOURS * 3600);
    }

    #[test]
    fn test_refresh_token_round_trip() {
        let service = TokenService::new(SECRET);

        let token = service.issue_refresh_token("user123").unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.typ, TokenType::Refresh);
        assert_eq!(
            claims.exp - claims.iat,
            DEFAULT_REFRESH_TTL_DAYS * 24 * 3600
        );
    }

    #[test]
    fn test_expired_token_rejected() {
        // Negative TTL puts exp well past the validation leeway
        let service =
            TokenService::with_ttls(SECRET, Duration::hours(-1), Duration::hours(-1));

        let token = service.issue_access_token("user123").unwrap();
        let result = service.validate(&token);

        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_foreign_key_rejected() {
        let issuer = TokenService::new(b"one_secret_key_at_least_32_bytes!");
        let validator = TokenService::new(b"other_secret_key_at_least_32_byt!");

        let token = issuer.issue_access_token("user123").unwrap();
        let result = validator.validate(&token);

        assert!(matches!(result, Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let service = TokenService::new(SECRET);

        let token = service.issue_access_token("user123").unwrap();
        let last = token.chars().last().unwrap();
        let flipped = if last == 'A' { 'B' } else { 'A' };
        let mut tampered = token[..token.len() - 1].to_string();
        tampered.push(flipped);

        let result = service.validate(&tampered);
        assert!(matches!(result, Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn test_algorithm_substitution_rejected() {
        let service = TokenService::new(SECRET);

        // Token signed with the same secret but a different HMAC variant
        let claims = TokenClaims {
            sub: "user123".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
            iat: Utc::now().timestamp(),
            typ: TokenType::Access,
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        let result = service.validate(&token);
        assert!(matches!(result, Err(TokenError::UnsupportedAlgorithm)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let service = TokenService::new(SECRET);

        let result = service.validate("not.a.token");
        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_extra_claims_rejected() {
        let service = TokenService::new(SECRET);

        // Valid signature, open claims bag: decoding into the closed struct
        // must fail rather than ignore the unknown field
        #[derive(serde::Serialize)]
        struct BaggyClaims {
            sub: String,
            exp: i64,
            iat: i64,
            typ: TokenType,
            role: String,
        }

        let claims = BaggyClaims {
            sub: "user123".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
            iat: Utc::now().timestamp(),
            typ: TokenType::Access,
            role: "admin".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        let result = service.validate(&token);
        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_missing_typ_rejected() {
        let service = TokenService::new(SECRET);

        #[derive(serde::Serialize)]
        struct UntypedClaims {
            sub: String,
            exp: i64,
            iat: i64,
        }

        let claims = UntypedClaims {
            sub: "user123".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
            iat: Utc::now().timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        let result = service.validate(&token);
        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }
}
