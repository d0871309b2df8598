//! Signed, stateless admin session tokens (HS256 JWT).

use crate::error::{Error, Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Session lifetime: 24 hours.
pub const TOKEN_TTL_SECS: i64 = 60 * 60 * 24;

/// Secret used outside production when none is configured.
pub const DEV_FALLBACK_SECRET: &str = "labsite-development-secret-do-not-use-in-production";

/// Identity of a signed-in administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    pub id: i64,
    pub username: String,
}

/// Claims embedded in a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub username: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expires at (Unix seconds)
    pub exp: i64,
}

/// Issues and verifies session tokens with a process-wide secret.
///
/// Changing the secret invalidates every outstanding session.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an explicit clock in `verify_at`.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token valid for [`TOKEN_TTL_SECS`] from now.
    pub fn issue(&self, admin_id: i64, username: &str) -> Result<String> {
        self.issue_at(admin_id, username, chrono::Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (Unix seconds).
    pub fn issue_at(&self, admin_id: i64, username: &str, now: i64) -> Result<String> {
        let claims = Claims {
            user_id: admin_id,
            username: username.to_string(),
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| Error::Internal(format!("Token signing failed: {}", e)))
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Option<AdminIdentity> {
        self.verify_at(token, chrono::Utc::now().timestamp())
    }

    /// Verify a token as if the current time were `now` (Unix seconds).
    ///
    /// Returns `None` for a bad signature, a malformed token, or `now >= exp`.
    pub fn verify_at(&self, token: &str, now: i64) -> Option<AdminIdentity> {
        let data = match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!("Rejected session token: {}", e);
                return None;
            }
        };

        if now >= data.claims.exp {
            tracing::debug!("Rejected expired session token for {}", data.claims.username);
            return None;
        }

        Some(AdminIdentity {
            id: data.claims.user_id,
            username: data.claims.username,
        })
    }
}
