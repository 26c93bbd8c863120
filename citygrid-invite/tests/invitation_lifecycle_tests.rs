//! End-to-end tests for the invitation lifecycle.
//!
//! These tests drive the engine, the stores, and the permission resolver
//! together, the way the platform's request handlers do: an invitation is
//! issued, the delivered token is accepted, and the resulting grants are
//! observed through the resolver rather than by peeking at edges.
//!
//! Test flows:
//! 1. issue → accept → resolver grants access → cancel → access revoked
//! 2. cancel of the invitee's default city reassigns the default
//! 3. replayed and rotated tokens
//! 4. cross-resource token misuse

use std::sync::Arc;
use uuid::Uuid;

use citygrid_access::{
    AccessRole, GlobalRole, MemoryMembershipStore, PermissionResolver, Session,
};
use citygrid_auth::{AuthError, TokenCodec};
use citygrid_invite::{
    InvitationEngine, InviteScope, InviteStatus, InviteStore, MemoryInviteStore, RecordingMailer,
};
use citygrid_org::{City, Inventory, Organization, Project, ResourceRef, UserContext};

const SECRET: &str = "integration-test-signing-secret-32-chars!";
const ACCEPT_URL: &str = "https://app.citygrid.dev/invites/accept";

/// Test fixture wiring the engine to shared in-memory stores.
struct TestFixture {
    engine: InvitationEngine,
    resolver: PermissionResolver,
    membership: Arc<MemoryMembershipStore>,
    invites: Arc<MemoryInviteStore>,
    mailer: Arc<RecordingMailer>,
    org: Organization,
    project: Project,
    city: City,
    sibling_city: City,
    inventory: Inventory,
    inviter: Session,
}

impl TestFixture {
    /// Build a tree with one org, one project, two cities, and one
    /// inventory, plus an org-admin inviter.
    async fn new() -> Self {
        let membership = MemoryMembershipStore::shared();
        let invites = MemoryInviteStore::shared(membership.clone());
        let mailer = RecordingMailer::shared();

        let org = Organization::new("Pacific Alliance", "pacific-alliance", Uuid::now_v7());
        let project = Project::new(org.id, "Coastal Cities", "coastal-cities");
        let city = City::new(project.id, "Puerto Vallarta").with_geocode("MX 20 067");
        let sibling_city = City::new(project.id, "Mazatlan");
        let inventory = Inventory::new(city.id, "GPC BASIC 2025", 2025);

        membership.insert_organization(org.clone()).await;
        membership.insert_project(project.clone()).await;
        membership.insert_city(city.clone()).await;
        membership.insert_city(sibling_city.clone()).await;
        membership.insert_inventory(inventory.clone()).await;

        let inviter = Session::non_expiring(
            Uuid::now_v7(),
            Some("Ana Flores".to_string()),
            "ana@example.com",
            GlobalRole::User,
        );
        membership
            .grant_organization_admin(inviter.user_id, org.id)
            .await;

        let engine = InvitationEngine::new(
            TokenCodec::with_secret(SECRET).unwrap(),
            invites.clone(),
            membership.clone(),
            mailer.clone(),
            ACCEPT_URL,
        );

        Self {
            resolver: PermissionResolver::new(membership.clone()),
            engine,
            membership,
            invites,
            mailer,
            org,
            project,
            city,
            sibling_city,
            inventory,
            inviter,
        }
    }

    fn session(email: &str) -> Session {
        Session::non_expiring(Uuid::now_v7(), None, email, GlobalRole::User)
    }

    /// The most recently delivered token.
    async fn last_token(&self) -> String {
        self.mailer.sent().await.last().unwrap().token.clone()
    }
}

// =============================================================================
// Flow 1: issue → accept → access granted → cancel → access revoked
// =============================================================================

#[tokio::test]
async fn test_full_city_invitation_flow() {
    let f = TestFixture::new().await;
    let invitee = TestFixture::session("maria@example.com");

    // Before the invitation the invitee can reach nothing.
    assert!(!f
        .resolver
        .can_access(Some(&invitee), &ResourceRef::City(f.city.id))
        .await
        .unwrap());

    let invitation = f
        .engine
        .issue(
            Some(&f.inviter),
            InviteScope::City(f.city.id),
            "maria@example.com",
        )
        .await
        .unwrap();
    assert_eq!(invitation.status, InviteStatus::Pending);

    let token = f.last_token().await;
    f.engine
        .accept(&invitee, &token, "maria@example.com", f.city.id)
        .await
        .unwrap();

    // The resolver now sees a collaborator grant on the city and its
    // inventory, but not on the sibling city.
    let decision = f
        .resolver
        .resolve(Some(&invitee), &ResourceRef::Inventory(f.inventory.id))
        .await
        .unwrap();
    assert_eq!(decision.role, AccessRole::Collaborator);
    assert!(decision.can_edit());
    assert!(!f
        .resolver
        .can_access(Some(&invitee), &ResourceRef::City(f.sibling_city.id))
        .await
        .unwrap());

    // Revoking the accepted invitation removes the grant again.
    f.invites
        .register_user("maria@example.com", invitee.user_id)
        .await;
    f.engine.cancel(&f.inviter, invitation.id).await.unwrap();

    assert!(!f
        .resolver
        .can_access(Some(&invitee), &ResourceRef::City(f.city.id))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_project_invitation_covers_subtree() {
    let f = TestFixture::new().await;
    let invitee = TestFixture::session("pedro@example.com");

    f.engine
        .issue(
            Some(&f.inviter),
            InviteScope::Project(f.project.id),
            "pedro@example.com",
        )
        .await
        .unwrap();
    let token = f.last_token().await;
    f.engine
        .accept(&invitee, &token, "pedro@example.com", f.project.id)
        .await
        .unwrap();

    // A project admin reaches both cities and the inventory, but not the
    // organization node itself.
    for reference in [
        ResourceRef::Project(f.project.id),
        ResourceRef::City(f.city.id),
        ResourceRef::City(f.sibling_city.id),
        ResourceRef::Inventory(f.inventory.id),
    ] {
        assert!(
            f.resolver.can_edit(Some(&invitee), &reference).await.unwrap(),
            "project admin should edit {reference}"
        );
    }
    assert!(!f
        .resolver
        .can_access(Some(&invitee), &ResourceRef::Organization(f.org.id))
        .await
        .unwrap());
}

// =============================================================================
// Flow 2: default-resource reassignment on cancellation
// =============================================================================

#[tokio::test]
async fn test_cancel_reassigns_default_city() {
    let f = TestFixture::new().await;
    let invitee = TestFixture::session("maria@example.com");
    f.invites
        .register_user("maria@example.com", invitee.user_id)
        .await;

    // The invitee keeps a separate collaborator grant on the sibling city.
    f.membership
        .grant_city_collaborator(invitee.user_id, f.sibling_city.id)
        .await;

    let invitation = f
        .engine
        .issue(
            Some(&f.inviter),
            InviteScope::City(f.city.id),
            "maria@example.com",
        )
        .await
        .unwrap();
    let token = f.last_token().await;
    f.engine
        .accept(&invitee, &token, "maria@example.com", f.city.id)
        .await
        .unwrap();

    // Their session points at the invited city.
    let mut context = UserContext::new(invitee.user_id);
    context.switch_city(f.city.id);
    context.switch_inventory(f.inventory.id);
    f.invites.put_context(context).await;

    f.engine.cancel(&f.inviter, invitation.id).await.unwrap();

    let context = f
        .invites
        .user_context(invitee.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(context.default_city_id, Some(f.sibling_city.id));
    assert_eq!(context.default_inventory_id, None);
}

#[tokio::test]
async fn test_cancel_clears_default_when_nothing_survives() {
    let f = TestFixture::new().await;
    let invitee = TestFixture::session("maria@example.com");
    f.invites
        .register_user("maria@example.com", invitee.user_id)
        .await;

    let invitation = f
        .engine
        .issue(
            Some(&f.inviter),
            InviteScope::City(f.city.id),
            "maria@example.com",
        )
        .await
        .unwrap();
    let token = f.last_token().await;
    f.engine
        .accept(&invitee, &token, "maria@example.com", f.city.id)
        .await
        .unwrap();

    let mut context = UserContext::new(invitee.user_id);
    context.switch_city(f.city.id);
    f.invites.put_context(context).await;

    f.engine.cancel(&f.inviter, invitation.id).await.unwrap();

    let context = f
        .invites
        .user_context(invitee.user_id)
        .await
        .unwrap()
        .unwrap();
    assert!(context.default_city_id.is_none());
}

#[tokio::test]
async fn test_cancel_leaves_unrelated_default_alone() {
    let f = TestFixture::new().await;
    let invitee = TestFixture::session("maria@example.com");
    f.invites
        .register_user("maria@example.com", invitee.user_id)
        .await;
    f.membership
        .grant_city_collaborator(invitee.user_id, f.sibling_city.id)
        .await;

    let invitation = f
        .engine
        .issue(
            Some(&f.inviter),
            InviteScope::City(f.city.id),
            "maria@example.com",
        )
        .await
        .unwrap();
    let token = f.last_token().await;
    f.engine
        .accept(&invitee, &token, "maria@example.com", f.city.id)
        .await
        .unwrap();

    // The default points at the sibling, which the cancellation does not
    // touch.
    let mut context = UserContext::new(invitee.user_id);
    context.switch_city(f.sibling_city.id);
    f.invites.put_context(context).await;

    f.engine.cancel(&f.inviter, invitation.id).await.unwrap();

    let context = f
        .invites
        .user_context(invitee.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(context.default_city_id, Some(f.sibling_city.id));
}

// =============================================================================
// Flow 3: token replay and rotation
// =============================================================================

#[tokio::test]
async fn test_replayed_token_fails_after_acceptance() {
    let f = TestFixture::new().await;
    let invitee = TestFixture::session("maria@example.com");

    f.engine
        .issue(
            Some(&f.inviter),
            InviteScope::City(f.city.id),
            "maria@example.com",
        )
        .await
        .unwrap();
    let token = f.last_token().await;

    f.engine
        .accept(&invitee, &token, "maria@example.com", f.city.id)
        .await
        .unwrap();

    let replay = f
        .engine
        .accept(&invitee, &token, "maria@example.com", f.city.id)
        .await;
    assert!(matches!(replay, Err(AuthError::Validation(_))));
}

#[tokio::test]
async fn test_canceled_token_cannot_be_used_after_resend() {
    let f = TestFixture::new().await;
    let invitee = TestFixture::session("maria@example.com");

    let invitation = f
        .engine
        .issue(
            Some(&f.inviter),
            InviteScope::City(f.city.id),
            "maria@example.com",
        )
        .await
        .unwrap();
    let original_token = f.last_token().await;

    f.engine.cancel(&f.inviter, invitation.id).await.unwrap();
    f.engine.resend(&f.inviter, invitation.id).await.unwrap();
    let fresh_token = f.last_token().await;
    assert_ne!(original_token, fresh_token);

    // The fresh token works; the invitation then leaves Pending, and the
    // original token fails the status check like any replay.
    f.engine
        .accept(&invitee, &fresh_token, "maria@example.com", f.city.id)
        .await
        .unwrap();
    let replay = f
        .engine
        .accept(&invitee, &original_token, "maria@example.com", f.city.id)
        .await;
    assert!(matches!(replay, Err(AuthError::Validation(_))));
}

// =============================================================================
// Flow 4: cross-resource misuse
// =============================================================================

#[tokio::test]
async fn test_token_for_one_city_rejected_on_another() {
    let f = TestFixture::new().await;
    let invitee = TestFixture::session("maria@example.com");

    f.engine
        .issue(
            Some(&f.inviter),
            InviteScope::City(f.city.id),
            "maria@example.com",
        )
        .await
        .unwrap();
    let token = f.last_token().await;

    let result = f
        .engine
        .accept(&invitee, &token, "maria@example.com", f.sibling_city.id)
        .await;
    assert!(matches!(result, Err(AuthError::Unauthorized(_))));

    // The invitation is untouched and still acceptable on the right city.
    f.engine
        .accept(&invitee, &token, "maria@example.com", f.city.id)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_collaborator_cannot_issue_for_sibling_city() {
    let f = TestFixture::new().await;
    let collaborator = TestFixture::session("carla@example.com");
    f.membership
        .grant_city_collaborator(collaborator.user_id, f.city.id)
        .await;

    // Write access to their own city lets them invite there...
    f.engine
        .issue(
            Some(&collaborator),
            InviteScope::City(f.city.id),
            "friend@example.com",
        )
        .await
        .unwrap();

    // ...but not to a sibling city they hold no grant on.
    let result = f
        .engine
        .issue(
            Some(&collaborator),
            InviteScope::City(f.sibling_city.id),
            "friend@example.com",
        )
        .await;
    assert!(matches!(result, Err(AuthError::Forbidden(_))));
}
