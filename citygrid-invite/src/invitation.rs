//! Invitation records and their state machine
//!
//! An invitation ties an invitee email to one node of the resource tree.
//! After creation only its status may change, and only along the
//! transitions the lifecycle engine drives.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use citygrid_org::ResourceRef;

use citygrid_auth::{AuthError, AuthResult};

/// The resource an invitation grants access to when accepted.
///
/// One variant per membership edge kind: accepting an organization
/// invitation creates an `OrganizationAdmin` edge, a project invitation a
/// `ProjectAdmin` edge, and a city invitation a `CityCollaborator` edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum InviteScope {
    /// Invitation to administer an organization
    Organization(Uuid),
    /// Invitation to administer a project
    Project(Uuid),
    /// Invitation to collaborate on a city
    City(Uuid),
}

impl InviteScope {
    /// The invited resource's id.
    pub fn resource_id(&self) -> Uuid {
        match self {
            InviteScope::Organization(id) | InviteScope::Project(id) | InviteScope::City(id) => *id,
        }
    }

    /// The resource reference used for authorization checks.
    pub fn resource_ref(&self) -> ResourceRef {
        match self {
            InviteScope::Organization(id) => ResourceRef::Organization(*id),
            InviteScope::Project(id) => ResourceRef::Project(*id),
            InviteScope::City(id) => ResourceRef::City(*id),
        }
    }
}

impl std::fmt::Display for InviteScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.resource_ref())
    }
}

/// Lifecycle status of an invitation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    /// Issued and awaiting acceptance
    Pending,
    /// Accepted; the membership edge exists
    Accepted,
    /// Withdrawn by the inviter
    Canceled,
    /// Token lifetime elapsed before acceptance
    Expired,
}

impl InviteStatus {
    /// Whether the transition to `next` is part of the lifecycle.
    ///
    /// The full transition set:
    ///
    /// ```text
    /// Pending  → Accepted   (accept)
    /// Pending  → Canceled   (cancel)
    /// Pending  → Expired    (lazy, at accept time)
    /// Canceled → Pending    (resend)
    /// Accepted → Canceled   (revoke the granted membership)
    /// ```
    ///
    /// Everything else, notably `Accepted → Pending`, is rejected.
    pub fn can_transition_to(self, next: InviteStatus) -> bool {
        matches!(
            (self, next),
            (InviteStatus::Pending, InviteStatus::Accepted)
                | (InviteStatus::Pending, InviteStatus::Canceled)
                | (InviteStatus::Pending, InviteStatus::Expired)
                | (InviteStatus::Canceled, InviteStatus::Pending)
                | (InviteStatus::Accepted, InviteStatus::Canceled)
        )
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            InviteStatus::Pending => "pending",
            InviteStatus::Accepted => "accepted",
            InviteStatus::Canceled => "canceled",
            InviteStatus::Expired => "expired",
        }
    }
}

impl std::fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An invitation to a resource.
///
/// The target scope and invitee email are immutable once issued; `status`
/// (and the accompanying `updated_at`) is the only field that changes
/// afterwards.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use citygrid_invite::{Invitation, InviteScope, InviteStatus};
///
/// let inviter = Uuid::now_v7();
/// let invitation = Invitation::new(
///     InviteScope::City(Uuid::now_v7()),
///     "Maria@Example.com",
///     inviter,
/// );
/// assert_eq!(invitation.status, InviteStatus::Pending);
/// assert_eq!(invitation.email, "maria@example.com");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    /// Unique invitation ID
    pub id: Uuid,

    /// Target resource
    pub scope: InviteScope,

    /// Invitee email (case-folded)
    pub email: String,

    /// The user who issued the invitation
    pub invited_by: Uuid,

    /// Lifecycle status
    pub status: InviteStatus,

    /// When the invitation was issued
    pub created_at: DateTime<Utc>,

    /// When the status last changed
    pub updated_at: DateTime<Utc>,
}

impl Invitation {
    /// Creates a new pending invitation.
    ///
    /// # Arguments
    ///
    /// * `scope` - Target resource
    /// * `email` - Invitee email (case-folded on construction)
    /// * `invited_by` - The issuing user
    pub fn new(scope: InviteScope, email: impl AsRef<str>, invited_by: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            scope,
            email: email.as_ref().trim().to_lowercase(),
            invited_by,
            status: InviteStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move the invitation to `next`.
    ///
    /// # Errors
    ///
    /// `AuthError::Validation` when the transition is not part of the
    /// lifecycle.
    pub fn transition(&mut self, next: InviteStatus) -> AuthResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(AuthError::Validation(format!(
                "invitation cannot move from '{}' to '{}'",
                self.status, next
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_invitation_is_pending() {
        let invitation = Invitation::new(
            InviteScope::City(Uuid::now_v7()),
            " Maria@Example.com ",
            Uuid::now_v7(),
        );

        assert_eq!(invitation.status, InviteStatus::Pending);
        assert_eq!(invitation.email, "maria@example.com");
        assert_eq!(invitation.created_at, invitation.updated_at);
    }

    #[test]
    fn test_transition_set_is_exact() {
        use InviteStatus::*;

        let allowed = [
            (Pending, Accepted),
            (Pending, Canceled),
            (Pending, Expired),
            (Canceled, Pending),
            (Accepted, Canceled),
        ];

        for from in [Pending, Accepted, Canceled, Expired] {
            for to in [Pending, Accepted, Canceled, Expired] {
                let expected = allowed.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "{from} -> {to} should be {expected}"
                );
            }
        }
    }

    #[test]
    fn test_accepted_cannot_return_to_pending() {
        let mut invitation = Invitation::new(
            InviteScope::Project(Uuid::now_v7()),
            "user@example.com",
            Uuid::now_v7(),
        );
        invitation.transition(InviteStatus::Accepted).unwrap();

        let result = invitation.transition(InviteStatus::Pending);
        assert!(matches!(result, Err(AuthError::Validation(_))));
        assert_eq!(invitation.status, InviteStatus::Accepted);
    }

    #[test]
    fn test_cancel_and_resend_round_trip() {
        let mut invitation = Invitation::new(
            InviteScope::Organization(Uuid::now_v7()),
            "user@example.com",
            Uuid::now_v7(),
        );

        invitation.transition(InviteStatus::Canceled).unwrap();
        invitation.transition(InviteStatus::Pending).unwrap();
        assert_eq!(invitation.status, InviteStatus::Pending);
    }

    #[test]
    fn test_scope_accessors() {
        let id = Uuid::now_v7();

        assert_eq!(InviteScope::City(id).resource_id(), id);
        assert_eq!(
            InviteScope::Project(id).resource_ref(),
            ResourceRef::Project(id)
        );
    }
}
