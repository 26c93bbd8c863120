//! Claims for signed, time-limited tokens
//!
//! This module defines the claims embedded in the platform's signed
//! tokens: invitation tokens and password-reset tokens. Claims are opaque
//! to callers; only the codec mints and verifies them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a signed token authorizes.
///
/// Verification requires the expected purpose to match, so a password
/// reset token can never be replayed as an invitation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Invitation to a resource in the tree
    Invite,
    /// Password reset for an existing account
    PasswordReset,
}

impl TokenPurpose {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::Invite => "invite",
            TokenPurpose::PasswordReset => "password_reset",
        }
    }
}

/// Claims carried by a signed token.
///
/// The subject is the email the token was issued to, case-folded. The
/// resource id is present only for invitation tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedClaims {
    /// Email the token was issued to (case-folded)
    pub sub: String,

    /// What the token authorizes
    pub purpose: TokenPurpose,

    /// Target resource for invitation tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<Uuid>,

    /// Expiration time
    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,

    /// Issued at
    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,

    /// Unique token identifier
    pub jti: Uuid,

    /// Issuer
    pub iss: String,
}

impl SignedClaims {
    /// Claims for an invitation token.
    ///
    /// # Arguments
    ///
    /// * `email` - Invitee email (case-folded on construction)
    /// * `resource_id` - Target resource of the invitation
    /// * `issuer` - Token issuer
    /// * `validity` - How long the token stays valid
    pub fn invite(
        email: impl AsRef<str>,
        resource_id: Uuid,
        issuer: impl Into<String>,
        validity: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: email.as_ref().trim().to_lowercase(),
            purpose: TokenPurpose::Invite,
            resource_id: Some(resource_id),
            exp: now + validity,
            iat: now,
            jti: Uuid::now_v7(),
            iss: issuer.into(),
        }
    }

    /// Claims for a password-reset token.
    pub fn password_reset(
        email: impl AsRef<str>,
        issuer: impl Into<String>,
        validity: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: email.as_ref().trim().to_lowercase(),
            purpose: TokenPurpose::PasswordReset,
            resource_id: None,
            exp: now + validity,
            iat: now,
            jti: Uuid::now_v7(),
            iss: issuer.into(),
        }
    }

    /// The email this token was issued to.
    pub fn email(&self) -> &str {
        &self.sub
    }
}
