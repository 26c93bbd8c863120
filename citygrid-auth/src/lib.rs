//! # CityGrid Authentication
//!
//! This crate provides token-based authentication for the CityGrid
//! platform: the signed, time-limited tokens behind invitations and
//! password resets, the long-lived personal access tokens for
//! programmatic API access, and the request rate limiter guarding
//! unauthenticated endpoints.
//!
//! ## Overview
//!
//! The citygrid-auth crate handles:
//! - **Errors**: The shared authentication/authorization error taxonomy
//! - **Claims**: Purpose-tagged claims for signed tokens
//! - **Codec**: Minting and verifying signed tokens (jsonwebtoken, HS256)
//! - **Personal access tokens**: Generation, digest storage, and
//!   verb/scope validation, including the JSON-RPC POST carve-out
//! - **Rate limiting**: Fixed-window counters keyed by caller
//!
//! ## Usage
//!
//! ### Signed tokens
//!
//! ```rust,no_run
//! use citygrid_auth::TokenCodec;
//! use uuid::Uuid;
//!
//! let codec = TokenCodec::with_secret("a-32-byte-minimum-signing-secret!").unwrap();
//! let token = codec.mint_invite("user@example.com", Uuid::now_v7()).unwrap();
//! let claims = codec.verify_invite(&token).unwrap();
//! assert_eq!(claims.email(), "user@example.com");
//! ```
//!
//! ### Personal access tokens
//!
//! ```rust,no_run
//! use citygrid_auth::pat::{MemoryTokenStore, PatValidator, PersonalAccessToken, Scope};
//! use uuid::Uuid;
//!
//! # async fn demo() -> citygrid_auth::AuthResult<()> {
//! let store = MemoryTokenStore::shared();
//! let (token, plaintext) =
//!     PersonalAccessToken::generate(Uuid::now_v7(), "CI exporter", vec![Scope::Read], None)?;
//!
//! let validator = PatValidator::new(store);
//! let authenticated = validator.validate(&plaintext, "GET", None).await?;
//! assert_eq!(authenticated.session.user_id, token.user_id);
//! # Ok(())
//! # }
//! ```
//!
//! ## Cross-Crate Integration
//!
//! This crate integrates with:
//! - `citygrid-access`: Sessions produced by the token validator
//! - `citygrid-invite`: The invitation lifecycle mints its tokens here

pub mod claims;
pub mod codec;
pub mod error;
pub mod pat;
pub mod rate_limit;

// Re-export main types for convenience
pub use claims::{SignedClaims, TokenPurpose};
pub use codec::{TokenCodec, DEFAULT_ISSUER, TOKEN_SECRET_ENV};
pub use error::{AuthError, AuthResult};
pub use pat::{
    AuthenticatedToken, EndpointClass, MemoryTokenStore, PatValidator, PersonalAccessToken, Scope,
    TokenOwner, TokenStore, TOKEN_PREFIX,
};
pub use rate_limit::RateLimiter;
