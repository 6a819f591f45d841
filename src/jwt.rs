//! Session token generation and validation.
//!
//! Tokens are HS256-signed JWTs carrying the user identity. The token string
//! doubles as the session ID, so a token is only honoured while its session
//! record exists (see `auth::sessions`).

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Default session token duration: 30 seconds
pub const SESSION_TOKEN_DURATION_SECS: u64 = 30;

/// Identity embedded in the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    /// User ID (UUID)
    pub id: String,
    /// Username
    pub username: String,
}

/// JWT claims for session tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// JWT ID, unique per issued token
    pub jti: String,
    pub user: UserClaims,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Configuration for JWT operations.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    duration: u64,
}

/// Result of issuing a session token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The JWT token string
    pub token: String,
    /// Issued at timestamp (Unix seconds)
    pub issued_at: u64,
    /// Expiration timestamp (Unix seconds)
    pub expires_at: u64,
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret and the default duration.
    pub fn new(secret: &[u8]) -> Self {
        Self::with_duration(secret, SESSION_TOKEN_DURATION_SECS)
    }

    /// Create a new JWT configuration with a custom token duration in seconds.
    pub fn with_duration(secret: &[u8], duration: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            duration,
        }
    }

    /// Token duration in seconds.
    pub fn duration(&self) -> u64 {
        self.duration
    }

    /// Issue a signed session token for a user.
    pub fn issue(&self, user_id: &str, username: &str) -> Result<IssuedToken, JwtError> {
        let now = unix_now()?;
        let exp = now + self.duration;

        let claims = SessionClaims {
            jti: uuid::Uuid::new_v4().to_string(),
            user: UserClaims {
                id: user_id.to_string(),
                username: username.to_string(),
            },
            iat: now,
            exp,
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)?;

        Ok(IssuedToken {
            token,
            issued_at: now,
            expires_at: exp,
        })
    }

    /// Verify signature, algorithm and expiry, then return the claims.
    /// Only HS256 is accepted.
    pub fn decode(&self, token: &str) -> Result<SessionClaims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data =
            jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &validation)
                .map_err(JwtError::Decoding)?;

        Ok(token_data.claims)
    }
}

/// Current Unix time in seconds.
pub fn unix_now() -> Result<u64, JwtError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| JwtError::TimeError)
}

/// Errors that can occur during JWT operations.
#[derive(Debug)]
pub enum JwtError {
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// Bad structure, signature, algorithm or expiry
    Decoding(jsonwebtoken::errors::Error),
    /// System time error
    TimeError,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::Decoding(e) => write!(f, "Failed to decode token: {}", e),
            JwtError::TimeError => write!(f, "System time error"),
        }
    }
}

impl std::error::Error for JwtError {}
