//! Signed token codec
//!
//! This module mints and verifies the signed, time-limited tokens used by
//! the invitation lifecycle and password resets, using the jsonwebtoken
//! crate with HS256. The signing secret is server-held configuration;
//! constructing a codec without one is a configuration error, never a
//! silent fallback.

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::claims::{SignedClaims, TokenPurpose};
use crate::error::{AuthError, AuthResult};

/// Environment variable holding the signing secret.
pub const TOKEN_SECRET_ENV: &str = "CITYGRID_TOKEN_SECRET";

/// Default issuer claim.
pub const DEFAULT_ISSUER: &str = "citygrid-platform";

/// Invitation tokens stay valid for 7 days.
pub const INVITE_TOKEN_VALIDITY_DAYS: i64 = 7;

/// Password-reset tokens stay valid for 1 hour.
pub const PASSWORD_RESET_VALIDITY_HOURS: i64 = 1;

/// Mints and verifies signed platform tokens.
///
/// # Examples
///
/// ```rust,no_run
/// use citygrid_auth::TokenCodec;
/// use uuid::Uuid;
///
/// let codec = TokenCodec::with_secret("a-32-byte-minimum-signing-secret!").unwrap();
/// let token = codec.mint_invite("user@example.com", Uuid::now_v7()).unwrap();
/// let claims = codec.verify_invite(&token).unwrap();
/// assert_eq!(claims.email(), "user@example.com");
/// ```
pub struct TokenCodec {
    issuer: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl TokenCodec {
    /// Create a codec with the given secret and the default issuer.
    ///
    /// # Errors
    ///
    /// `AuthError::Config` when the secret is empty.
    pub fn with_secret(secret: impl AsRef<str>) -> AuthResult<Self> {
        Self::new(secret, DEFAULT_ISSUER)
    }

    /// Create a codec with an explicit issuer.
    pub fn new(secret: impl AsRef<str>, issuer: impl Into<String>) -> AuthResult<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(AuthError::Config("signing secret is not set".to_string()));
        }

        Ok(Self {
            issuer: issuer.into(),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    /// Create a codec from the `CITYGRID_TOKEN_SECRET` environment
    /// variable.
    ///
    /// # Errors
    ///
    /// `AuthError::Config` when the variable is unset or empty.
    pub fn from_env() -> AuthResult<Self> {
        let secret = std::env::var(TOKEN_SECRET_ENV)
            .map_err(|_| AuthError::Config(format!("{TOKEN_SECRET_ENV} is not set")))?;
        Self::with_secret(secret)
    }

    /// The issuer claim this codec stamps and expects.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Mint an invitation token with the standard 7-day validity.
    ///
    /// # Arguments
    ///
    /// * `email` - Invitee email
    /// * `resource_id` - Target resource of the invitation
    pub fn mint_invite(&self, email: impl AsRef<str>, resource_id: Uuid) -> AuthResult<String> {
        self.mint_invite_with_validity(email, resource_id, Duration::days(INVITE_TOKEN_VALIDITY_DAYS))
    }

    /// Mint an invitation token with an explicit validity.
    pub fn mint_invite_with_validity(
        &self,
        email: impl AsRef<str>,
        resource_id: Uuid,
        validity: Duration,
    ) -> AuthResult<String> {
        let claims = SignedClaims::invite(email, resource_id, self.issuer.clone(), validity);
        self.encode(&claims)
    }

    /// Mint a password-reset token with the standard 1-hour validity.
    pub fn mint_password_reset(&self, email: impl AsRef<str>) -> AuthResult<String> {
        let claims = SignedClaims::password_reset(
            email,
            self.issuer.clone(),
            Duration::hours(PASSWORD_RESET_VALIDITY_HOURS),
        );
        self.encode(&claims)
    }

    /// Verify a token and require the `Invite` purpose.
    pub fn verify_invite(&self, token: &str) -> AuthResult<SignedClaims> {
        self.verify(token, TokenPurpose::Invite)
    }

    /// Verify a token and require the `PasswordReset` purpose.
    pub fn verify_password_reset(&self, token: &str) -> AuthResult<SignedClaims> {
        self.verify(token, TokenPurpose::PasswordReset)
    }

    /// Verify signature, expiry, issuer, and purpose.
    ///
    /// # Errors
    ///
    /// - `AuthError::TokenExpired` when the embedded expiry has passed
    /// - `AuthError::InvalidToken` for malformed tokens, bad signatures,
    ///   and wrong issuers
    /// - `AuthError::Unauthorized` when the purpose does not match
    pub fn verify(&self, token: &str, expected_purpose: TokenPurpose) -> AuthResult<SignedClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);

        let data = decode::<SignedClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AuthError::InvalidToken("Malformed token".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AuthError::InvalidToken("Invalid signature".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                    AuthError::InvalidToken("Invalid issuer".to_string())
                }
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        let claims = data.claims;
        if claims.purpose != expected_purpose {
            return Err(AuthError::Unauthorized(format!(
                "token purpose '{}' does not match '{}'",
                claims.purpose.as_str(),
                expected_purpose.as_str()
            )));
        }

        Ok(claims)
    }

    fn encode(&self, claims: &SignedClaims) -> AuthResult<String> {
        let header = Header::new(Algorithm::HS256);
        encode(&header, claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Token encoding failed: {}", e)))
    }
}
