//! Session type
//!
//! A session is the ephemeral caller identity handed to the permission
//! resolver. Cookie-derived sessions are built by the host platform's
//! request layer; sessions derived from personal access tokens are built
//! by the token validator with exactly the same shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::GlobalRole;

/// An authenticated caller.
///
/// The email is case-folded at construction so that membership and
/// invitation lookups compare emails consistently.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Utc};
/// use uuid::Uuid;
/// use citygrid_access::{GlobalRole, Session};
///
/// let session = Session::new(
///     Uuid::now_v7(),
///     Some("Maria Santos".to_string()),
///     "Maria@Example.com",
///     GlobalRole::User,
///     Utc::now() + Duration::hours(8),
/// );
/// assert_eq!(session.email, "maria@example.com");
/// assert!(!session.is_expired());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// User ID
    pub user_id: Uuid,

    /// Display name
    pub name: Option<String>,

    /// Case-folded email address
    pub email: String,

    /// Platform-wide role
    pub global_role: GlobalRole,

    /// When the session stops being valid
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Creates a new session.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The authenticated user
    /// * `name` - Display name, if known
    /// * `email` - Email address (case-folded on construction)
    /// * `global_role` - Platform-wide role
    /// * `expires_at` - Expiry instant
    pub fn new(
        user_id: Uuid,
        name: Option<String>,
        email: impl AsRef<str>,
        global_role: GlobalRole,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            name,
            email: email.as_ref().trim().to_lowercase(),
            global_role,
            expires_at,
        }
    }

    /// Creates a session with the far-future expiry sentinel.
    ///
    /// Used for personal access tokens that carry no expiry of their own.
    pub fn non_expiring(
        user_id: Uuid,
        name: Option<String>,
        email: impl AsRef<str>,
        global_role: GlobalRole,
    ) -> Self {
        Self::new(user_id, name, email, global_role, DateTime::<Utc>::MAX_UTC)
    }

    /// Whether the session has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Whether this session bypasses all tree checks.
    pub fn is_system_admin(&self) -> bool {
        self.global_role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_email_case_folded() {
        let session = Session::new(
            Uuid::now_v7(),
            None,
            "  Maria@Example.COM ",
            GlobalRole::User,
            Utc::now() + Duration::hours(1),
        );

        assert_eq!(session.email, "maria@example.com");
    }

    #[test]
    fn test_expiry() {
        let expired = Session::new(
            Uuid::now_v7(),
            None,
            "a@b.c",
            GlobalRole::User,
            Utc::now() - Duration::seconds(1),
        );
        assert!(expired.is_expired());

        let live = Session::non_expiring(Uuid::now_v7(), None, "a@b.c", GlobalRole::User);
        assert!(!live.is_expired());
    }

    #[test]
    fn test_system_admin() {
        let admin = Session::non_expiring(Uuid::now_v7(), None, "a@b.c", GlobalRole::Admin);
        let user = Session::non_expiring(Uuid::now_v7(), None, "a@b.c", GlobalRole::User);

        assert!(admin.is_system_admin());
        assert!(!user.is_system_admin());
    }
}
