//! Invitation store abstraction
//!
//! This module defines the write side of the relational collaborator the
//! lifecycle engine depends on. The two `commit_*` operations are the
//! transactional heart of the engine: each applies a membership-edge
//! mutation and an invitation status change as one atomic operation, so
//! no reader ever observes an accepted invitation without its edge or an
//! edge without its status update.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use citygrid_access::{MembershipStore, MemoryMembershipStore};
use citygrid_auth::{AuthError, AuthResult};
use citygrid_org::{MembershipEdge, UserContext};

use crate::invitation::{Invitation, InviteScope, InviteStatus};

/// The membership edge removed when canceling an accepted invitation.
#[derive(Debug, Clone)]
pub struct EdgeRemoval {
    /// The invitee whose grant is revoked
    pub user_id: Uuid,
    /// The granted scope being revoked
    pub scope: InviteScope,
}

/// How the invitee's default resource changes when their grant goes away.
#[derive(Debug, Clone)]
pub enum DefaultReassignment {
    /// Point the default at a city the user can still reach
    Assign {
        /// The invitee
        user_id: Uuid,
        /// The surviving city
        city_id: Uuid,
    },
    /// No surviving grant; clear the default entirely
    Clear {
        /// The invitee
        user_id: Uuid,
    },
}

/// Everything a cancellation of an accepted invitation must apply
/// together with the status change.
#[derive(Debug, Clone)]
pub struct CancellationEffects {
    /// The edge to delete
    pub remove_edge: EdgeRemoval,
    /// Default-resource reassignment, when the revoked resource was the
    /// invitee's default
    pub reassign_default: Option<DefaultReassignment>,
}

/// Storage for invitations and the transactional membership writes the
/// lifecycle performs.
///
/// Implementations must apply each `commit_*` operation atomically:
/// both writes succeed or both roll back, and concurrent commits against
/// the same invitation are serialized so that at most one acceptance can
/// succeed.
#[async_trait]
pub trait InviteStore: Send + Sync {
    /// Persist a freshly issued invitation.
    async fn insert(&self, invitation: Invitation) -> AuthResult<()>;

    /// Fetch an invitation by id.
    async fn invitation(&self, id: Uuid) -> AuthResult<Option<Invitation>>;

    /// Fetch the invitation for an (email, resource) pair, regardless of
    /// status. When several exist, the most recently updated wins.
    async fn find_by_email_and_resource(
        &self,
        email: &str,
        resource_id: Uuid,
    ) -> AuthResult<Option<Invitation>>;

    /// Apply a status-only transition (resend, lazy expiry).
    ///
    /// # Errors
    ///
    /// `AuthError::NotFound` for unknown invitations,
    /// `AuthError::Validation` for transitions outside the lifecycle.
    async fn set_status(&self, id: Uuid, status: InviteStatus) -> AuthResult<Invitation>;

    /// Atomically create the membership edge and mark the invitation
    /// accepted.
    ///
    /// # Errors
    ///
    /// `AuthError::Validation` when the invitation is no longer pending;
    /// this is what stops two concurrent accepts from both succeeding.
    async fn commit_acceptance(
        &self,
        invitation_id: Uuid,
        edge: MembershipEdge,
    ) -> AuthResult<Invitation>;

    /// Atomically mark the invitation canceled and, for accepted
    /// invitations, delete the edge and apply the default reassignment.
    async fn commit_cancellation(
        &self,
        invitation_id: Uuid,
        effects: Option<CancellationEffects>,
    ) -> AuthResult<Invitation>;

    /// Resolve an invitee email to a user account, if one exists.
    async fn user_id_for_email(&self, email: &str) -> AuthResult<Option<Uuid>>;

    /// Fetch a user's working context.
    async fn user_context(&self, user_id: Uuid) -> AuthResult<Option<UserContext>>;

    /// A city the user can still reach once the given scope is revoked,
    /// if any.
    async fn surviving_city(&self, user_id: Uuid, excluding: &InviteScope)
        -> AuthResult<Option<Uuid>>;
}

/// In-memory invitation store layered over a [`MemoryMembershipStore`].
///
/// The membership store carries the tree and the edges (so a resolver
/// sharing it observes acceptance and cancellation immediately); this
/// store adds invitations, the email directory, and user contexts.
/// Commit operations hold the invitation write lock across the edge
/// mutation, which serializes concurrent commits on the same invitation.
pub struct MemoryInviteStore {
    membership: Arc<MemoryMembershipStore>,
    invitations: RwLock<HashMap<Uuid, Invitation>>,
    users_by_email: RwLock<HashMap<String, Uuid>>,
    contexts: RwLock<HashMap<Uuid, UserContext>>,
}

impl std::fmt::Debug for MemoryInviteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryInviteStore").finish()
    }
}

impl MemoryInviteStore {
    /// Create a store over the given membership store.
    pub fn new(membership: Arc<MemoryMembershipStore>) -> Self {
        Self {
            membership,
            invitations: RwLock::new(HashMap::new()),
            users_by_email: RwLock::new(HashMap::new()),
            contexts: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store wrapped in an `Arc`.
    pub fn shared(membership: Arc<MemoryMembershipStore>) -> Arc<Self> {
        Arc::new(Self::new(membership))
    }

    /// The underlying membership store.
    pub fn membership(&self) -> Arc<MemoryMembershipStore> {
        self.membership.clone()
    }

    /// Register a user account under its email (case-folded).
    pub async fn register_user(&self, email: impl AsRef<str>, user_id: Uuid) {
        self.users_by_email
            .write()
            .await
            .insert(email.as_ref().trim().to_lowercase(), user_id);
    }

    /// Store a user's working context.
    pub async fn put_context(&self, context: UserContext) {
        self.contexts.write().await.insert(context.user_id, context);
    }

    async fn apply_edge(&self, edge: &MembershipEdge) {
        match edge {
            MembershipEdge::OrganizationAdmin(e) => {
                self.membership
                    .grant_organization_admin(e.user_id, e.organization_id)
                    .await
            }
            MembershipEdge::ProjectAdmin(e) => {
                self.membership
                    .grant_project_admin(e.user_id, e.project_id)
                    .await
            }
            MembershipEdge::CityCollaborator(e) => {
                self.membership
                    .grant_city_collaborator(e.user_id, e.city_id)
                    .await
            }
        }
    }

    async fn remove_edge(&self, removal: &EdgeRemoval) {
        match removal.scope {
            InviteScope::Organization(id) => {
                self.membership
                    .revoke_organization_admin(removal.user_id, id)
                    .await
            }
            InviteScope::Project(id) => {
                self.membership
                    .revoke_project_admin(removal.user_id, id)
                    .await
            }
            InviteScope::City(id) => {
                self.membership
                    .revoke_city_collaborator(removal.user_id, id)
                    .await
            }
        }
    }

    async fn apply_reassignment(&self, reassignment: &DefaultReassignment) {
        let mut contexts = self.contexts.write().await;
        match reassignment {
            DefaultReassignment::Assign { user_id, city_id } => {
                contexts
                    .entry(*user_id)
                    .or_insert_with(|| UserContext::new(*user_id))
                    .switch_city(*city_id);
            }
            DefaultReassignment::Clear { user_id } => {
                if let Some(context) = contexts.get_mut(user_id) {
                    context.clear_defaults();
                }
            }
        }
    }

    /// Whether a city falls inside the given scope.
    async fn city_in_scope(&self, city_id: Uuid, scope: &InviteScope) -> AuthResult<bool> {
        match scope {
            InviteScope::City(id) => Ok(city_id == *id),
            InviteScope::Project(id) => {
                let city = self.membership.city(city_id).await?;
                Ok(city.map(|c| c.project_id == *id).unwrap_or(false))
            }
            InviteScope::Organization(id) => {
                let Some(city) = self.membership.city(city_id).await? else {
                    return Ok(false);
                };
                let project = self.membership.project(city.project_id).await?;
                Ok(project.map(|p| p.organization_id == *id).unwrap_or(false))
            }
        }
    }
}

#[async_trait]
impl InviteStore for MemoryInviteStore {
    async fn insert(&self, invitation: Invitation) -> AuthResult<()> {
        self.invitations
            .write()
            .await
            .insert(invitation.id, invitation);
        Ok(())
    }

    async fn invitation(&self, id: Uuid) -> AuthResult<Option<Invitation>> {
        Ok(self.invitations.read().await.get(&id).cloned())
    }

    async fn find_by_email_and_resource(
        &self,
        email: &str,
        resource_id: Uuid,
    ) -> AuthResult<Option<Invitation>> {
        let email = email.trim().to_lowercase();
        Ok(self
            .invitations
            .read()
            .await
            .values()
            .filter(|invite| invite.email == email && invite.scope.resource_id() == resource_id)
            .max_by_key(|invite| invite.updated_at)
            .cloned())
    }

    async fn set_status(&self, id: Uuid, status: InviteStatus) -> AuthResult<Invitation> {
        let mut invitations = self.invitations.write().await;
        let invitation = invitations
            .get_mut(&id)
            .ok_or_else(|| AuthError::NotFound(format!("invitation {id}")))?;
        invitation.transition(status)?;
        Ok(invitation.clone())
    }

    async fn commit_acceptance(
        &self,
        invitation_id: Uuid,
        edge: MembershipEdge,
    ) -> AuthResult<Invitation> {
        // The write guard is held across the edge write, serializing
        // concurrent accepts of the same invitation.
        let mut invitations = self.invitations.write().await;
        let invitation = invitations
            .get_mut(&invitation_id)
            .ok_or_else(|| AuthError::NotFound(format!("invitation {invitation_id}")))?;

        if invitation.status != InviteStatus::Pending {
            return Err(AuthError::Validation(format!(
                "invitation is not pending (status: {})",
                invitation.status
            )));
        }

        self.apply_edge(&edge).await;
        invitation.transition(InviteStatus::Accepted)?;
        Ok(invitation.clone())
    }

    async fn commit_cancellation(
        &self,
        invitation_id: Uuid,
        effects: Option<CancellationEffects>,
    ) -> AuthResult<Invitation> {
        let mut invitations = self.invitations.write().await;
        let invitation = invitations
            .get_mut(&invitation_id)
            .ok_or_else(|| AuthError::NotFound(format!("invitation {invitation_id}")))?;

        // Validate the transition before touching edges, so a bad cancel
        // leaves everything untouched.
        if !invitation.status.can_transition_to(InviteStatus::Canceled) {
            return Err(AuthError::Validation(format!(
                "invitation cannot move from '{}' to 'canceled'",
                invitation.status
            )));
        }

        if let Some(effects) = &effects {
            self.remove_edge(&effects.remove_edge).await;
            if let Some(reassignment) = &effects.reassign_default {
                self.apply_reassignment(reassignment).await;
            }
        }

        invitation.transition(InviteStatus::Canceled)?;
        Ok(invitation.clone())
    }

    async fn user_id_for_email(&self, email: &str) -> AuthResult<Option<Uuid>> {
        Ok(self
            .users_by_email
            .read()
            .await
            .get(&email.trim().to_lowercase())
            .copied())
    }

    async fn user_context(&self, user_id: Uuid) -> AuthResult<Option<UserContext>> {
        Ok(self.contexts.read().await.get(&user_id).cloned())
    }

    async fn surviving_city(
        &self,
        user_id: Uuid,
        excluding: &InviteScope,
    ) -> AuthResult<Option<Uuid>> {
        for city_id in self.membership.collaborator_cities(user_id).await {
            if !self.city_in_scope(city_id, excluding).await? {
                return Ok(Some(city_id));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citygrid_org::{City, CityCollaborator, Organization, Project};

    async fn store() -> Arc<MemoryInviteStore> {
        MemoryInviteStore::shared(MemoryMembershipStore::shared())
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let store = store().await;
        let invitation = Invitation::new(
            InviteScope::City(Uuid::now_v7()),
            "maria@example.com",
            Uuid::now_v7(),
        );

        store.insert(invitation.clone()).await.unwrap();

        let found = store.invitation(invitation.id).await.unwrap().unwrap();
        assert_eq!(found.email, "maria@example.com");

        let by_pair = store
            .find_by_email_and_resource("MARIA@example.com", invitation.scope.resource_id())
            .await
            .unwrap();
        assert!(by_pair.is_some());
    }

    #[tokio::test]
    async fn test_commit_acceptance_writes_edge_and_status() {
        let store = store().await;
        let city_id = Uuid::now_v7();
        let user_id = Uuid::now_v7();
        let invitation = Invitation::new(InviteScope::City(city_id), "m@example.com", Uuid::now_v7());
        store.insert(invitation.clone()).await.unwrap();

        let edge = MembershipEdge::CityCollaborator(CityCollaborator::new(city_id, user_id));
        let accepted = store.commit_acceptance(invitation.id, edge).await.unwrap();

        assert_eq!(accepted.status, InviteStatus::Accepted);
        assert!(store
            .membership()
            .is_city_collaborator(user_id, city_id)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_second_acceptance_rejected() {
        let store = store().await;
        let city_id = Uuid::now_v7();
        let invitation = Invitation::new(InviteScope::City(city_id), "m@example.com", Uuid::now_v7());
        store.insert(invitation.clone()).await.unwrap();

        let edge = || {
            MembershipEdge::CityCollaborator(CityCollaborator::new(city_id, Uuid::now_v7()))
        };
        store.commit_acceptance(invitation.id, edge()).await.unwrap();

        let result = store.commit_acceptance(invitation.id, edge()).await;
        assert!(matches!(result, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn test_cancellation_removes_edge_and_reassigns_default() {
        let store = store().await;
        let city_id = Uuid::now_v7();
        let fallback_city = Uuid::now_v7();
        let user_id = Uuid::now_v7();

        store
            .membership()
            .grant_city_collaborator(user_id, city_id)
            .await;
        store
            .membership()
            .grant_city_collaborator(user_id, fallback_city)
            .await;

        let mut context = UserContext::new(user_id);
        context.switch_city(city_id);
        store.put_context(context).await;

        let mut invitation =
            Invitation::new(InviteScope::City(city_id), "m@example.com", Uuid::now_v7());
        invitation.transition(InviteStatus::Accepted).unwrap();
        store.insert(invitation.clone()).await.unwrap();

        let effects = CancellationEffects {
            remove_edge: EdgeRemoval {
                user_id,
                scope: InviteScope::City(city_id),
            },
            reassign_default: Some(DefaultReassignment::Assign {
                user_id,
                city_id: fallback_city,
            }),
        };
        let canceled = store
            .commit_cancellation(invitation.id, Some(effects))
            .await
            .unwrap();

        assert_eq!(canceled.status, InviteStatus::Canceled);
        assert!(!store
            .membership()
            .is_city_collaborator(user_id, city_id)
            .await
            .unwrap());

        let context = store.user_context(user_id).await.unwrap().unwrap();
        assert_eq!(context.default_city_id, Some(fallback_city));
    }

    #[tokio::test]
    async fn test_surviving_city_respects_scope() {
        let membership = MemoryMembershipStore::shared();
        let store = MemoryInviteStore::shared(membership.clone());

        let org = Organization::new("Org", "org", Uuid::now_v7());
        let project = Project::new(org.id, "P", "p");
        let other_project = Project::new(org.id, "Q", "q");
        let inside = City::new(project.id, "Inside");
        let outside = City::new(other_project.id, "Outside");

        membership.insert_organization(org.clone()).await;
        membership.insert_project(project.clone()).await;
        membership.insert_project(other_project.clone()).await;
        membership.insert_city(inside.clone()).await;
        membership.insert_city(outside.clone()).await;

        let user_id = Uuid::now_v7();
        membership.grant_city_collaborator(user_id, inside.id).await;
        membership.grant_city_collaborator(user_id, outside.id).await;

        // Losing the project takes the inside city with it.
        let survivor = store
            .surviving_city(user_id, &InviteScope::Project(project.id))
            .await
            .unwrap();
        assert_eq!(survivor, Some(outside.id));

        // Losing the whole organization leaves nothing.
        let survivor = store
            .surviving_city(user_id, &InviteScope::Organization(org.id))
            .await
            .unwrap();
        assert_eq!(survivor, None);
    }

    #[tokio::test]
    async fn test_set_status_validates_transition() {
        let store = store().await;
        let mut invitation =
            Invitation::new(InviteScope::City(Uuid::now_v7()), "m@example.com", Uuid::now_v7());
        invitation.transition(InviteStatus::Accepted).unwrap();
        store.insert(invitation.clone()).await.unwrap();

        let result = store.set_status(invitation.id, InviteStatus::Pending).await;
        assert!(matches!(result, Err(AuthError::Validation(_))));
    }
}
