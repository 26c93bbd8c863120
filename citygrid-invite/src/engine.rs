//! Invitation lifecycle engine
//!
//! The engine owns every invitation state transition: it issues signed
//! invitation tokens, validates acceptance, performs the transactional
//! membership-creation, and cancels grants with their cascading
//! default-resource reassignment. Nothing else in the platform mutates
//! invitations or invitation-derived membership edges.

use std::sync::Arc;
use uuid::Uuid;

use citygrid_access::{MembershipStore, PermissionResolver, Session};
use citygrid_auth::{AuthError, AuthResult, TokenCodec};
use citygrid_org::{
    CityCollaborator, MembershipEdge, OrganizationAdmin, ProjectAdmin, UserContext,
};

use crate::invitation::{Invitation, InviteScope, InviteStatus};
use crate::mailer::InviteMailer;
use crate::store::{CancellationEffects, DefaultReassignment, EdgeRemoval, InviteStore};

/// Drives the invitation lifecycle.
///
/// ```text
/// issue   ─→ Pending ──accept──→ Accepted
///              │  ▲                  │
///         cancel  resend          cancel (revokes the edge)
///              ▼  │                  ▼
///            Canceled            Canceled
///              │
///       (lazy, at accept) Pending ──→ Expired
/// ```
///
/// # Examples
///
/// ```rust,no_run
/// use citygrid_access::MemoryMembershipStore;
/// use citygrid_auth::TokenCodec;
/// use citygrid_invite::{InvitationEngine, MemoryInviteStore, RecordingMailer};
///
/// let membership = MemoryMembershipStore::shared();
/// let engine = InvitationEngine::new(
///     TokenCodec::with_secret("a-32-byte-minimum-signing-secret!").unwrap(),
///     MemoryInviteStore::shared(membership.clone()),
///     membership,
///     RecordingMailer::shared(),
///     "https://app.citygrid.dev/invites/accept",
/// );
/// # let _ = engine;
/// ```
pub struct InvitationEngine {
    codec: TokenCodec,
    invites: Arc<dyn InviteStore>,
    membership: Arc<dyn MembershipStore>,
    resolver: PermissionResolver,
    mailer: Arc<dyn InviteMailer>,
    accept_base_url: String,
}

impl std::fmt::Debug for InvitationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvitationEngine")
            .field("accept_base_url", &self.accept_base_url)
            .finish()
    }
}

impl InvitationEngine {
    /// Create an engine.
    ///
    /// # Arguments
    ///
    /// * `codec` - Signed-token codec (construction already failed if the
    ///   signing secret was unset)
    /// * `invites` - Invitation store
    /// * `membership` - Membership store shared with the rest of the
    ///   platform
    /// * `mailer` - Outbound email collaborator
    /// * `accept_base_url` - Base URL for acceptance links
    pub fn new(
        codec: TokenCodec,
        invites: Arc<dyn InviteStore>,
        membership: Arc<dyn MembershipStore>,
        mailer: Arc<dyn InviteMailer>,
        accept_base_url: impl Into<String>,
    ) -> Self {
        Self {
            codec,
            invites,
            resolver: PermissionResolver::new(membership.clone()),
            membership,
            mailer,
            accept_base_url: accept_base_url.into(),
        }
    }

    /// The resolver used to authorize issuing callers.
    pub fn resolver(&self) -> &PermissionResolver {
        &self.resolver
    }

    /// Issue an invitation.
    ///
    /// Requires write access to the target resource. Persists the pending
    /// invitation, mints a 7-day signed token, and hands token and
    /// acceptance link to the mailer.
    ///
    /// # Errors
    ///
    /// - `AuthError::Unauthorized` without a session
    /// - `AuthError::NotFound` when the target resource does not exist
    /// - `AuthError::Forbidden` without write access to the target
    /// - `AuthError::Validation` for a malformed invitee email
    pub async fn issue(
        &self,
        session: Option<&Session>,
        scope: InviteScope,
        email: &str,
    ) -> AuthResult<Invitation> {
        let Some(session) = session else {
            return Err(AuthError::Unauthorized(
                "authentication required to issue invitations".to_string(),
            ));
        };

        let email = normalize_email(email)?;

        if !self.resource_exists(&scope).await? {
            return Err(AuthError::NotFound(format!("resource {}", scope)));
        }

        if !self
            .resolver
            .can_edit(Some(session), &scope.resource_ref())
            .await?
        {
            return Err(AuthError::Forbidden(
                "issuing an invitation requires write access to the target resource".to_string(),
            ));
        }

        let invitation = Invitation::new(scope, &email, session.user_id);
        self.invites.insert(invitation.clone()).await?;

        let token = self.codec.mint_invite(&email, scope.resource_id())?;
        let url = self.accept_url(&token, &email, scope.resource_id());
        self.mailer
            .send_invitation(&invitation, &token, &url)
            .await?;

        tracing::info!(
            invitation_id = %invitation.id,
            scope = %invitation.scope,
            invited_by = %session.user_id,
            "invitation issued"
        );
        Ok(invitation)
    }

    /// Accept an invitation.
    ///
    /// Verifies the token's signature and expiry, requires the token
    /// email, the request email, and the session email to agree, and
    /// requires the token's resource to match the request's. The
    /// membership edge and the status change are committed as one atomic
    /// store operation.
    ///
    /// An expired token lazily moves the pending invitation to `Expired`.
    /// An invitation that is no longer pending cannot be accepted again,
    /// so a replayed token fails even though its signature still
    /// verifies.
    ///
    /// # Errors
    ///
    /// - `AuthError::TokenExpired` / `AuthError::InvalidToken` /
    ///   `AuthError::Unauthorized` for token, email, or resource
    ///   mismatches
    /// - `AuthError::NotFound` when no invitation exists for the pair
    /// - `AuthError::Validation` when the invitation is not pending
    pub async fn accept(
        &self,
        session: &Session,
        token: &str,
        email: &str,
        resource_id: Uuid,
    ) -> AuthResult<Invitation> {
        let email = normalize_email(email)?;

        let claims = match self.codec.verify_invite(token) {
            Ok(claims) => claims,
            Err(AuthError::TokenExpired) => {
                self.expire_pending(&email, resource_id).await;
                return Err(AuthError::TokenExpired);
            }
            Err(e) => return Err(e),
        };

        if claims.email() != email || session.email != email {
            return Err(AuthError::Unauthorized(
                "invitation email mismatch".to_string(),
            ));
        }
        if claims.resource_id != Some(resource_id) {
            return Err(AuthError::Unauthorized(
                "invitation resource mismatch".to_string(),
            ));
        }

        let invitation = self
            .invites
            .find_by_email_and_resource(&email, resource_id)
            .await?
            .ok_or_else(|| {
                AuthError::NotFound("no invitation for this email and resource".to_string())
            })?;

        match invitation.status {
            InviteStatus::Pending => {}
            InviteStatus::Accepted => {
                return Err(AuthError::Validation(
                    "invitation has already been accepted".to_string(),
                ));
            }
            status => {
                return Err(AuthError::Validation(format!(
                    "invitation is not pending (status: {status})"
                )));
            }
        }

        let edge = edge_for(&invitation, session.user_id);
        let accepted = self.invites.commit_acceptance(invitation.id, edge).await?;

        tracing::info!(
            invitation_id = %accepted.id,
            user_id = %session.user_id,
            scope = %accepted.scope,
            "invitation accepted"
        );
        Ok(accepted)
    }

    /// Cancel an invitation.
    ///
    /// Only the original inviter may cancel. Canceling an accepted
    /// invitation also deletes the membership edge and, when the revoked
    /// resource was the invitee's default, reassigns the default to a
    /// surviving grant or clears it, all inside the same atomic store
    /// operation as the status change.
    ///
    /// # Errors
    ///
    /// - `AuthError::NotFound` for unknown invitations
    /// - `AuthError::Forbidden` for callers other than the inviter
    /// - `AuthError::Validation` when the invitation is already canceled
    ///   or expired
    pub async fn cancel(&self, session: &Session, invitation_id: Uuid) -> AuthResult<Invitation> {
        let invitation = self
            .invites
            .invitation(invitation_id)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("invitation {invitation_id}")))?;

        if invitation.invited_by != session.user_id {
            return Err(AuthError::Forbidden(
                "only the inviting user may cancel an invitation".to_string(),
            ));
        }

        let effects = match invitation.status {
            InviteStatus::Accepted => self.cancellation_effects(&invitation).await?,
            _ => None,
        };

        let canceled = self
            .invites
            .commit_cancellation(invitation.id, effects)
            .await?;

        tracing::info!(
            invitation_id = %canceled.id,
            scope = %canceled.scope,
            "invitation canceled"
        );
        Ok(canceled)
    }

    /// Resend an invitation.
    ///
    /// Only the original inviter may resend. A canceled invitation moves
    /// back to pending; a pending one stays pending. A fresh token is
    /// minted on every resend, so a token leaked before cancellation is
    /// useless afterwards.
    ///
    /// # Errors
    ///
    /// - `AuthError::NotFound` for unknown invitations
    /// - `AuthError::Forbidden` for callers other than the inviter
    /// - `AuthError::Validation` for accepted or expired invitations
    pub async fn resend(&self, session: &Session, invitation_id: Uuid) -> AuthResult<Invitation> {
        let invitation = self
            .invites
            .invitation(invitation_id)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("invitation {invitation_id}")))?;

        if invitation.invited_by != session.user_id {
            return Err(AuthError::Forbidden(
                "only the inviting user may resend an invitation".to_string(),
            ));
        }

        let invitation = match invitation.status {
            InviteStatus::Pending => invitation,
            InviteStatus::Canceled => {
                self.invites
                    .set_status(invitation.id, InviteStatus::Pending)
                    .await?
            }
            status => {
                return Err(AuthError::Validation(format!(
                    "invitation cannot be resent (status: {status})"
                )));
            }
        };

        let token = self
            .codec
            .mint_invite(&invitation.email, invitation.scope.resource_id())?;
        let url = self.accept_url(&token, &invitation.email, invitation.scope.resource_id());
        self.mailer
            .send_invitation(&invitation, &token, &url)
            .await?;

        tracing::info!(invitation_id = %invitation.id, "invitation resent");
        Ok(invitation)
    }

    /// Mark the pending invitation for (email, resource) expired. Called
    /// when an acceptance presented an expired token; the caller still
    /// sees `TokenExpired`, so a failure here only affects stored state
    /// and is logged.
    async fn expire_pending(&self, email: &str, resource_id: Uuid) {
        match self.invites.find_by_email_and_resource(email, resource_id).await {
            Ok(Some(invitation)) if invitation.status == InviteStatus::Pending => {
                match self
                    .invites
                    .set_status(invitation.id, InviteStatus::Expired)
                    .await
                {
                    Ok(_) => {
                        tracing::info!(invitation_id = %invitation.id, "invitation expired at accept time");
                    }
                    Err(e) => {
                        tracing::warn!(invitation_id = %invitation.id, error = %e, "failed to expire invitation");
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "failed to look up invitation for expiry");
            }
        }
    }

    /// Compute the edge removal and default reassignment for canceling
    /// an accepted invitation. The effects are applied atomically with
    /// the status change by the store.
    async fn cancellation_effects(
        &self,
        invitation: &Invitation,
    ) -> AuthResult<Option<CancellationEffects>> {
        let Some(user_id) = self.invites.user_id_for_email(&invitation.email).await? else {
            // The account is gone; there is no edge left to revoke.
            return Ok(None);
        };

        let reassign_default = match self.invites.user_context(user_id).await? {
            Some(context) if self.default_affected(&context, &invitation.scope).await? => {
                match self
                    .invites
                    .surviving_city(user_id, &invitation.scope)
                    .await?
                {
                    Some(city_id) => Some(DefaultReassignment::Assign { user_id, city_id }),
                    None => Some(DefaultReassignment::Clear { user_id }),
                }
            }
            _ => None,
        };

        Ok(Some(CancellationEffects {
            remove_edge: EdgeRemoval {
                user_id,
                scope: invitation.scope,
            },
            reassign_default,
        }))
    }

    /// Whether the invited resource exists in the tree.
    async fn resource_exists(&self, scope: &InviteScope) -> AuthResult<bool> {
        let exists = match scope {
            InviteScope::Organization(id) => self.membership.organization(*id).await?.is_some(),
            InviteScope::Project(id) => self.membership.project(*id).await?.is_some(),
            InviteScope::City(id) => self.membership.city(*id).await?.is_some(),
        };
        Ok(exists)
    }

    /// Whether the user's default city falls under the revoked scope.
    async fn default_affected(
        &self,
        context: &UserContext,
        scope: &InviteScope,
    ) -> AuthResult<bool> {
        let Some(default_city) = context.default_city_id else {
            return Ok(false);
        };

        match scope {
            InviteScope::City(id) => Ok(default_city == *id),
            InviteScope::Project(id) => {
                let city = self.membership.city(default_city).await?;
                Ok(city.map(|c| c.project_id == *id).unwrap_or(false))
            }
            InviteScope::Organization(id) => {
                let Some(city) = self.membership.city(default_city).await? else {
                    return Ok(false);
                };
                let project = self.membership.project(city.project_id).await?;
                Ok(project.map(|p| p.organization_id == *id).unwrap_or(false))
            }
        }
    }

    fn accept_url(&self, token: &str, email: &str, resource_id: Uuid) -> String {
        format!(
            "{}?token={}&email={}&resource={}",
            self.accept_base_url, token, email, resource_id
        )
    }
}

/// The membership edge an acceptance creates.
fn edge_for(invitation: &Invitation, user_id: Uuid) -> MembershipEdge {
    match invitation.scope {
        InviteScope::Organization(id) => MembershipEdge::OrganizationAdmin(
            OrganizationAdmin::new(id, user_id).with_inviter(invitation.invited_by),
        ),
        InviteScope::Project(id) => MembershipEdge::ProjectAdmin(
            ProjectAdmin::new(id, user_id).with_inviter(invitation.invited_by),
        ),
        InviteScope::City(id) => MembershipEdge::CityCollaborator(
            CityCollaborator::new(id, user_id).with_inviter(invitation.invited_by),
        ),
    }
}

fn normalize_email(email: &str) -> AuthResult<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AuthError::Validation(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(email)
}
