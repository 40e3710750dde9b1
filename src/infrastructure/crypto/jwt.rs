//! JWT Token handling
//!
//! Tokens are HS256-signed and carry `user_id`, `role`, `iat` and `exp`.
//! Validation is stateless: signature, algorithm and expiry are recomputed on
//! every call, so an issued token cannot be revoked before it expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::UserId;

/// The only algorithm issued and accepted.
const ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration time in hours
    pub expiration_hours: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-env".to_string(),
            expiration_hours: 24,
        }
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration_hours", &self.expiration_hours)
            .finish()
    }
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: UserId,
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Identity recovered from a valid token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIdentity {
    pub user_id: UserId,
    pub role: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    /// Malformed, expired, wrongly signed or wrong algorithm. Callers never
    /// learn which.
    #[error("invalid token")]
    Invalid,

    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),

    #[error("token lifetime of {0}h is out of range")]
    LifetimeOutOfRange(i64),
}

/// Issues and validates bearer tokens with a process-wide symmetric secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_hours: i64,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            ttl_hours: config.expiration_hours,
        }
    }

    pub fn ttl_hours(&self) -> i64 {
        self.ttl_hours
    }

    /// Create a token for a user, expiring `ttl_hours` from now
    pub fn issue(&self, user_id: UserId, role: &str) -> Result<String, TokenError> {
        self.issue_at(user_id, role, Utc::now())
    }

    /// Create a token as if issued at `issued_at`
    pub fn issue_at(
        &self,
        user_id: UserId,
        role: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let expires_at = Duration::try_hours(self.ttl_hours)
            .and_then(|ttl| issued_at.checked_add_signed(ttl))
            .ok_or(TokenError::LifetimeOutOfRange(self.ttl_hours))?;

        let claims = TokenClaims {
            user_id,
            role: role.to_string(),
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key).map_err(TokenError::Signing)
    }

    /// Verify and decode a token
    pub fn validate(&self, token: &str) -> Result<TokenIdentity, TokenError> {
        match decode::<TokenClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(TokenIdentity {
                user_id: data.claims.user_id,
                role: data.claims.role,
            }),
            Err(e) => {
                let reason = match e.kind() {
                    ErrorKind::ExpiredSignature => "expired",
                    ErrorKind::InvalidSignature => "bad signature",
                    ErrorKind::InvalidAlgorithm => "unexpected algorithm",
                    ErrorKind::MissingRequiredClaim(_) => "missing claim",
                    _ => "malformed",
                };
                debug!(reason, error = %e, "Token rejected");
                Err(TokenError::Invalid)
            }
        }
    }
}
