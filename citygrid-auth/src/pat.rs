//! Personal access tokens
//!
//! Long-lived, scope-limited bearer credentials for programmatic API
//! access. The plaintext token is generated once at creation and never
//! recoverable afterwards: only its one-way digest and a short display
//! prefix persist. Validation hashes the presented plaintext, looks the
//! digest up, and checks the token's scopes against the HTTP verb.

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use citygrid_access::{GlobalRole, Session, StoreResult};

use crate::error::{AuthError, AuthResult};

/// Literal prefix distinguishing personal access tokens from session
/// cookies.
pub const TOKEN_PREFIX: &str = "cgp_";

/// Length of the displayable plaintext prefix.
pub const DISPLAY_PREFIX_LEN: usize = 12;

/// Bytes of entropy in the token suffix.
const TOKEN_ENTROPY_BYTES: usize = 32;

/// Coarse permission tag attached to a personal access token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Read-only API access
    Read,
    /// Mutating API access
    Write,
}

impl Scope {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Read => "read",
            Scope::Write => "write",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "read" => Some(Scope::Read),
            "write" => Some(Scope::Write),
            _ => None,
        }
    }
}

/// Endpoint families with distinct scope rules.
///
/// Almost every endpoint follows the verb-to-scope mapping; the
/// machine-to-machine JSON-RPC endpoint is the one documented carve-out,
/// accepting `POST` under the `read` scope because its transport wraps
/// read-only queries in POST bodies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EndpointClass {
    /// Regular REST endpoints
    Standard,
    /// Machine-to-machine JSON-RPC endpoint
    MachineRpc,
}

/// The scope a request needs, from its verb and endpoint class.
///
/// # Errors
///
/// `AuthError::Validation` for verbs outside the supported set.
pub fn required_scope(method: &str, endpoint_class: Option<EndpointClass>) -> AuthResult<Scope> {
    match method.to_uppercase().as_str() {
        "GET" | "HEAD" => Ok(Scope::Read),
        "POST" if endpoint_class == Some(EndpointClass::MachineRpc) => Ok(Scope::Read),
        "POST" | "PUT" | "PATCH" | "DELETE" => Ok(Scope::Write),
        other => Err(AuthError::Validation(format!(
            "unsupported HTTP method '{other}'"
        ))),
    }
}

/// Compute the one-way digest of a plaintext token.
///
/// SHA-256, base64url-encoded. This is the only representation of the
/// secret that is ever stored or compared.
pub fn hash_token(plaintext: &str) -> String {
    let digest = Sha256::digest(plaintext.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// A stored personal access token.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use citygrid_auth::pat::{PersonalAccessToken, Scope, TOKEN_PREFIX};
///
/// let user_id = Uuid::now_v7();
/// let (token, plaintext) =
///     PersonalAccessToken::generate(user_id, "CI exporter", vec![Scope::Read], None).unwrap();
///
/// assert!(plaintext.starts_with(TOKEN_PREFIX));
/// assert_eq!(token.token_prefix, &plaintext[..12]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalAccessToken {
    /// Unique token ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Display name chosen by the owner
    pub name: String,

    /// One-way digest of the plaintext (never the plaintext itself)
    pub token_hash: String,

    /// First characters of the plaintext, safe to display
    pub token_prefix: String,

    /// Granted scopes (non-empty)
    pub scopes: Vec<Scope>,

    /// Optional expiry
    pub expires_at: Option<DateTime<Utc>>,

    /// Advisory last-use timestamp, updated best-effort
    pub last_used_at: Option<DateTime<Utc>>,

    /// When the token was created
    pub created_at: DateTime<Utc>,
}

impl PersonalAccessToken {
    /// Generate a new token.
    ///
    /// Returns the stored record and the plaintext. The plaintext is the
    /// only copy that will ever exist; callers must hand it to the user
    /// immediately and drop it.
    ///
    /// # Errors
    ///
    /// `AuthError::Validation` when no scope is requested.
    pub fn generate(
        user_id: Uuid,
        name: impl Into<String>,
        scopes: Vec<Scope>,
        expires_at: Option<DateTime<Utc>>,
    ) -> AuthResult<(Self, String)> {
        if scopes.is_empty() {
            return Err(AuthError::Validation(
                "a personal access token needs at least one scope".to_string(),
            ));
        }

        let mut deduped = scopes;
        deduped.sort_by_key(|s| s.as_str());
        deduped.dedup();

        let mut entropy = [0u8; TOKEN_ENTROPY_BYTES];
        rand::thread_rng().fill_bytes(&mut entropy);
        let plaintext = format!("{}{}", TOKEN_PREFIX, URL_SAFE_NO_PAD.encode(entropy));

        let record = Self {
            id: Uuid::now_v7(),
            user_id,
            name: name.into(),
            token_hash: hash_token(&plaintext),
            token_prefix: plaintext[..DISPLAY_PREFIX_LEN].to_string(),
            scopes: deduped,
            expires_at,
            last_used_at: None,
            created_at: Utc::now(),
        };

        Ok((record, plaintext))
    }

    /// Whether the token has expired.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= Utc::now(),
            None => false,
        }
    }

    /// Whether the token carries the given scope.
    pub fn has_scope(&self, scope: Scope) -> bool {
        self.scopes.contains(&scope)
    }
}

/// The owner of a personal access token, as stored alongside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenOwner {
    /// User ID
    pub id: Uuid,

    /// Display name
    pub name: Option<String>,

    /// Email address
    pub email: String,

    /// Platform-wide role
    pub global_role: GlobalRole,
}

/// Storage for personal access tokens.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Look a token up by its digest, together with its owner.
    async fn find_by_digest(
        &self,
        digest: &str,
    ) -> StoreResult<Option<(PersonalAccessToken, TokenOwner)>>;

    /// Record a use of the token. Advisory; callers treat failures as
    /// telemetry loss, not as errors.
    async fn touch_last_used(&self, token_id: Uuid, when: DateTime<Utc>) -> StoreResult<()>;
}

/// In-memory token store for tests and single-process deployments.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<HashMap<String, (PersonalAccessToken, TokenOwner)>>,
    touches: AtomicU64,
    fail_touches: AtomicBool,
}

impl MemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store wrapped in an `Arc`.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Insert a token with its owner.
    pub async fn insert(&self, token: PersonalAccessToken, owner: TokenOwner) {
        self.tokens
            .write()
            .await
            .insert(token.token_hash.clone(), (token, owner));
    }

    /// Number of successful `touch_last_used` calls.
    pub fn touch_count(&self) -> u64 {
        self.touches.load(Ordering::Relaxed)
    }

    /// Make subsequent `touch_last_used` calls fail. Lets tests observe
    /// that validation swallows telemetry failures.
    pub fn fail_touches(&self, fail: bool) {
        self.fail_touches.store(fail, Ordering::Relaxed);
    }

    /// Fetch a stored token by id.
    pub async fn get(&self, token_id: Uuid) -> Option<PersonalAccessToken> {
        self.tokens
            .read()
            .await
            .values()
            .find(|(token, _)| token.id == token_id)
            .map(|(token, _)| token.clone())
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn find_by_digest(
        &self,
        digest: &str,
    ) -> StoreResult<Option<(PersonalAccessToken, TokenOwner)>> {
        Ok(self.tokens.read().await.get(digest).cloned())
    }

    async fn touch_last_used(&self, token_id: Uuid, when: DateTime<Utc>) -> StoreResult<()> {
        if self.fail_touches.load(Ordering::Relaxed) {
            return Err(citygrid_access::StoreError::Unavailable(
                "simulated touch failure".to_string(),
            ));
        }

        let mut tokens = self.tokens.write().await;
        if let Some((token, _)) = tokens.values_mut().find(|(token, _)| token.id == token_id) {
            token.last_used_at = Some(when);
        }
        self.touches.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// A successfully validated personal access token.
#[derive(Debug, Clone)]
pub struct AuthenticatedToken {
    /// Session equivalent in shape to a cookie session
    pub session: Session,

    /// Scopes the token carries
    pub scopes: Vec<Scope>,

    /// The validated token's id
    pub token_id: Uuid,
}

/// Validates personal access tokens against a token store.
///
/// # Examples
///
/// ```rust,no_run
/// use citygrid_auth::pat::{MemoryTokenStore, PatValidator};
///
/// let store = MemoryTokenStore::shared();
/// let validator = PatValidator::new(store);
/// # let _ = validator;
/// ```
pub struct PatValidator {
    store: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for PatValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatValidator").finish()
    }
}

impl PatValidator {
    /// Create a validator over the given token store.
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Validate a presented token for a request.
    ///
    /// Steps:
    /// 1. Require the `cgp_` literal prefix.
    /// 2. Digest the plaintext and look it up; plaintext is never stored
    ///    or compared.
    /// 3. Reject expired tokens.
    /// 4. Check the token's scopes against the verb (and the JSON-RPC
    ///    carve-out).
    /// 5. Touch `last_used_at` on a background task; a failed touch is
    ///    logged and swallowed.
    /// 6. Return a session mirroring the cookie-session shape, expiring
    ///    when the token does (or never, via the far-future sentinel).
    ///
    /// # Arguments
    ///
    /// * `plaintext` - The presented bearer token
    /// * `method` - HTTP verb of the request
    /// * `endpoint_class` - Endpoint family; `None` means standard
    pub async fn validate(
        &self,
        plaintext: &str,
        method: &str,
        endpoint_class: Option<EndpointClass>,
    ) -> AuthResult<AuthenticatedToken> {
        if !plaintext.starts_with(TOKEN_PREFIX) {
            return Err(AuthError::Unauthorized("invalid access token".to_string()));
        }

        let digest = hash_token(plaintext);
        let Some((token, owner)) = self.store.find_by_digest(&digest).await? else {
            return Err(AuthError::Unauthorized("invalid access token".to_string()));
        };

        if token.is_expired() {
            return Err(AuthError::Unauthorized("access token expired".to_string()));
        }

        let required = required_scope(method, endpoint_class)?;
        if !token.has_scope(required) {
            return Err(AuthError::Forbidden(format!(
                "access token is missing the '{}' scope",
                required.as_str()
            )));
        }

        self.touch_in_background(token.id);

        let session = match token.expires_at {
            Some(expires_at) => Session::new(
                owner.id,
                owner.name.clone(),
                &owner.email,
                owner.global_role,
                expires_at,
            ),
            None => Session::non_expiring(owner.id, owner.name.clone(), &owner.email, owner.global_role),
        };

        Ok(AuthenticatedToken {
            session,
            scopes: token.scopes.clone(),
            token_id: token.id,
        })
    }

    /// Dispatch the advisory `last_used_at` update. Failures are
    /// observable only in logs.
    fn touch_in_background(&self, token_id: Uuid) {
        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(e) = store.touch_last_used(token_id, Utc::now()).await {
                tracing::debug!(token_id = %token_id, error = %e, "access token last_used_at update failed");
            }
        });
    }
}
