//! Bearer token decoding.
//!
//! The backend issues HS256 JSON Web Tokens. The client never holds the
//! signing secret, so it only reads the payload segment: the server remains
//! the authority and rejects forged tokens with a 401 on the first request.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

use crate::models::Role;

/// Reasons a token cannot be turned into a [`Session`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("invalid token claims: {0}")]
    Claims(String),

    #[error("token expired at {0}")]
    Expired(OffsetDateTime),
}

/// Claims carried in the token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's email.
    pub sub: String,
    pub role: Role,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    /// Site scope; absent (or null) for users that see every site.
    #[serde(default)]
    pub site_id: Option<i64>,
}

impl Claims {
    /// Decodes the payload segment of `token` without verifying the signature.
    pub fn decode(token: &str) -> Result<Self, TokenError> {
        let mut segments = token.split('.');
        let payload = match (segments.next(), segments.next(), segments.next()) {
            (Some(_), Some(payload), Some(_)) if !payload.is_empty() => payload,
            _ => {
                return Err(TokenError::Malformed(
                    "expected three dot-separated segments".to_string(),
                ))
            }
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| TokenError::Malformed(format!("payload is not base64url: {e}")))?;

        serde_json::from_slice(&bytes).map_err(|e| TokenError::Claims(e.to_string()))
    }
}

/// The authenticated identity derived from a bearer token.
///
/// A `Session` is always rebuilt from the token alone; it never needs a
/// round trip to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub email: String,
    pub role: Role,
    pub site_id: Option<i64>,
    pub expires_at: OffsetDateTime,
}

impl Session {
    /// Builds a session from decoded claims, rejecting an unrepresentable expiry.
    pub fn from_claims(claims: Claims) -> Result<Self, TokenError> {
        let expires_at = OffsetDateTime::from_unix_timestamp(claims.exp)
            .map_err(|e| TokenError::Claims(format!("exp out of range: {e}")))?;

        Ok(Self {
            email: claims.sub,
            role: claims.role,
            site_id: claims.site_id,
            expires_at,
        })
    }

    /// Decodes `token` and checks it against the current time.
    pub fn from_token(token: &str) -> Result<Self, TokenError> {
        Self::from_token_at(token, OffsetDateTime::now_utc())
    }

    /// Decodes `token` and checks it against `now`.
    pub fn from_token_at(token: &str, now: OffsetDateTime) -> Result<Self, TokenError> {
        let session = Self::from_claims(Claims::decode(token)?)?;
        if session.is_expired_at(now) {
            return Err(TokenError::Expired(session.expires_at));
        }
        Ok(session)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }

    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at < now
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == Role::Superadmin
    }

    /// Admins and superadmins both count as administrators.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Superadmin)
    }

    /// Site-less sessions see every site.
    pub fn can_access_site(&self, site_id: i64) -> bool {
        self.site_id.map_or(true, |own| own == site_id)
    }
}
