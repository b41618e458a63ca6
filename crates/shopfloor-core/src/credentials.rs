//! # Credential Service
//!
//! Password hashing and bearer tokens.
//!
//! ## Token Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/auth/login                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  verify_password(plain, stored_hash)   (Argon2id, PHC string)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  issue_token(email) ──► HS256 JWT { sub: email, iat, exp, jti }        │
//! │                                                                         │
//! │  Authorization: Bearer <jwt>                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  verify_token(jwt) ──► Ok(email) │ Err(InvalidToken)                   │
//! │                        expired, bad signature, malformed → all Invalid │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The service is built from an [`AuthConfig`] at startup and handed to
//! whoever needs it. There is no global key.

use std::fmt;

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Default access token lifetime: 30 minutes.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 30 * 60;

/// Longest access token lifetime accepted from configuration: 30 days.
pub const MAX_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

// =============================================================================
// Configuration
// =============================================================================

/// Settings for the credential service.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign and verify tokens.
    pub jwt_secret: String,
    /// Lifetime of issued access tokens, in seconds.
    pub access_token_ttl_secs: i64,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        AuthConfig {
            jwt_secret: jwt_secret.into(),
            access_token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }

    /// Sets the access token lifetime.
    pub fn access_token_ttl_secs(mut self, secs: i64) -> Self {
        self.access_token_ttl_secs = secs;
        self
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .finish()
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Credential failures.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The hasher itself failed (not a wrong password).
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// A token could not be signed.
    #[error("Token signing failed: {0}")]
    Signing(String),

    /// Expired, badly signed or malformed token.
    #[error("Invalid or expired token")]
    InvalidToken,
}

// =============================================================================
// Claims
// =============================================================================

/// JWT claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account email.
    pub sub: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token id.
    pub jti: String,
}

// =============================================================================
// Service
// =============================================================================

/// Hashes passwords and issues/verifies bearer tokens.
#[derive(Clone)]
pub struct CredentialService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_ttl_secs: i64,
    /// Verified against when an email is unknown, so both failure paths cost
    /// one Argon2 verification.
    dummy_hash: String,
}

impl fmt::Debug for CredentialService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialService")
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .finish_non_exhaustive()
    }
}

impl CredentialService {
    /// Builds the service. Hashes one throwaway password up front.
    pub fn new(config: &AuthConfig) -> Result<Self, CredentialError> {
        let secret = config.jwt_secret.as_bytes();
        let dummy_hash = hash_with_fresh_salt(Uuid::new_v4().to_string().as_bytes())?;

        Ok(CredentialService {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_token_ttl_secs: config.access_token_ttl_secs,
            dummy_hash,
        })
    }

    /// Lifetime of tokens from [`issue_token`](Self::issue_token), in seconds.
    pub fn access_token_ttl_secs(&self) -> i64 {
        self.access_token_ttl_secs
    }

    /// Hashes a plaintext password with a fresh random salt.
    ///
    /// Returns a PHC string (`$argon2id$v=19$...`) that embeds the salt
    /// and parameters.
    pub fn hash_password(&self, plaintext: &str) -> Result<String, CredentialError> {
        hash_with_fresh_salt(plaintext.as_bytes())
    }

    /// Checks a plaintext password against a stored hash.
    ///
    /// A stored hash that cannot be parsed verifies as `false`.
    pub fn verify_password(&self, plaintext: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "Stored password hash is not a valid PHC string");
                return false;
            }
        };

        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// Burns one verification against the dummy hash. Used when the email
    /// is unknown so the response time does not reveal it.
    pub fn verify_against_dummy(&self, plaintext: &str) {
        let _ = self.verify_password(plaintext, &self.dummy_hash);
    }

    /// Issues an access token for `subject_email` with the configured TTL.
    pub fn issue_token(&self, subject_email: &str) -> Result<String, CredentialError> {
        self.issue_token_with_ttl(subject_email, self.access_token_ttl_secs)
    }

    /// Issues an access token that expires `ttl_secs` from now.
    pub fn issue_token_with_ttl(
        &self,
        subject_email: &str,
        ttl_secs: i64,
    ) -> Result<String, CredentialError> {
        let now = Utc::now();
        let exp = Duration::try_seconds(ttl_secs)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                CredentialError::Signing(format!("token lifetime out of range: {ttl_secs}s"))
            })?;

        let claims = Claims {
            sub: subject_email.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| CredentialError::Signing(e.to_string()))
    }

    /// Verifies a token and returns its subject email.
    ///
    /// Every failure (expiry, bad signature, malformed payload) is the same
    /// [`CredentialError::InvalidToken`]; the reason is only logged.
    pub fn verify_token(&self, token: &str) -> Result<String, CredentialError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims.sub),
            Err(e) => {
                debug!(error = %e, "Rejected bearer token");
                Err(CredentialError::InvalidToken)
            }
        }
    }
}

fn hash_with_fresh_salt(plaintext: &[u8]) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext, &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::Hashing(e.to_string()))
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    let (scheme, token) = auth_header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

// =============================================================================
// Unit Tests
// =============================================================================
