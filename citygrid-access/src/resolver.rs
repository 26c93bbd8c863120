//! Hierarchical permission resolution
//!
//! This module answers "may this caller do X to resource Y" by walking
//! the resource tree upward from the referenced node and scanning the
//! caller's membership edges in precedence order. Denial is a value, not
//! an error: the only `Err` a resolution can produce is a membership
//! store failure.

use std::sync::Arc;
use uuid::Uuid;

use citygrid_org::{Inventory, ResourceRef};

use crate::precedence::{EdgeKind, MEMBERSHIP_PRECEDENCE};
use crate::roles::AccessRole;
use crate::session::Session;
use crate::store::{MembershipStore, StoreResult};

/// The outcome of resolving a session against a resource reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDecision {
    /// Whether any access is granted
    pub has_access: bool,

    /// The role the caller holds over the referenced resource
    pub role: AccessRole,

    /// The organization owning the referenced resource, when the ancestor
    /// chain was resolved
    pub organization_id: Option<Uuid>,
}

impl AccessDecision {
    /// A granted decision with the given role.
    pub fn granted(role: AccessRole, organization_id: Option<Uuid>) -> Self {
        Self {
            has_access: true,
            role,
            organization_id,
        }
    }

    /// A denied decision.
    pub fn denied(organization_id: Option<Uuid>) -> Self {
        Self {
            has_access: false,
            role: AccessRole::NoAccess,
            organization_id,
        }
    }

    /// Whether the decision permits writes.
    pub fn can_edit(&self) -> bool {
        self.has_access && self.role.can_edit()
    }
}

/// The ancestor chain of a referenced node, resolved up to the root.
///
/// Fields below the reference's own level stay `None`: a project
/// reference never resolves a city, so a `CityCollaborator` edge can
/// never cover it.
struct AncestorChain {
    organization_id: Uuid,
    project_id: Option<Uuid>,
    city_id: Option<Uuid>,
    inventory: Option<Inventory>,
}

/// Resolves access decisions against the membership store.
///
/// The resolver is cheap to clone and holds no per-request state; the
/// request layer constructs one per process and injects it into handlers.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use citygrid_access::{MemoryMembershipStore, PermissionResolver};
/// use citygrid_org::ResourceRef;
/// use uuid::Uuid;
///
/// # async fn demo() -> Result<(), citygrid_access::StoreError> {
/// let store = MemoryMembershipStore::shared();
/// let resolver = PermissionResolver::new(store);
///
/// let decision = resolver
///     .resolve(None, &ResourceRef::Inventory(Uuid::now_v7()))
///     .await?;
/// assert!(!decision.has_access);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PermissionResolver {
    store: Arc<dyn MembershipStore>,
}

impl std::fmt::Debug for PermissionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionResolver").finish()
    }
}

impl PermissionResolver {
    /// Create a resolver over the given membership store.
    pub fn new(store: Arc<dyn MembershipStore>) -> Self {
        Self { store }
    }

    /// The membership store this resolver reads from.
    pub fn store(&self) -> Arc<dyn MembershipStore> {
        self.store.clone()
    }

    /// Resolve the caller's role over the referenced resource.
    ///
    /// The algorithm:
    /// 1. Global `Admin` sessions short-circuit to `SystemAdmin` with no
    ///    store lookups. The organization id is populated only when the
    ///    reference itself is an organization.
    /// 2. The ancestor chain is resolved; a missing node anywhere in the
    ///    chain denies access.
    /// 3. Membership edges are scanned strongest grant first via
    ///    [`MEMBERSHIP_PRECEDENCE`]; the first edge covering the chain
    ///    wins. Roles are never unioned across unrelated subtrees.
    /// 4. With no edge, a published inventory reference grants
    ///    `PublicReader` even to a `None` session.
    ///
    /// Expired sessions are the request layer's concern; the resolver
    /// treats whatever session it is handed as authenticated.
    pub async fn resolve(
        &self,
        session: Option<&Session>,
        reference: &ResourceRef,
    ) -> StoreResult<AccessDecision> {
        if let Some(session) = session {
            if session.is_system_admin() {
                let organization_id = match reference {
                    ResourceRef::Organization(id) => Some(*id),
                    _ => None,
                };
                return Ok(AccessDecision::granted(
                    AccessRole::SystemAdmin,
                    organization_id,
                ));
            }
        }

        let chain = match self.resolve_chain(reference).await? {
            Some(chain) => chain,
            None => return Ok(AccessDecision::denied(None)),
        };

        if let Some(session) = session {
            for (kind, role) in MEMBERSHIP_PRECEDENCE {
                if self.edge_covers(session.user_id, *kind, &chain).await? {
                    return Ok(AccessDecision::granted(*role, Some(chain.organization_id)));
                }
            }
        }

        if let Some(inventory) = &chain.inventory {
            if inventory.is_public {
                return Ok(AccessDecision::granted(
                    AccessRole::PublicReader,
                    Some(chain.organization_id),
                ));
            }
        }

        Ok(AccessDecision::denied(Some(chain.organization_id)))
    }

    /// Whether the caller may read the referenced resource.
    ///
    /// Permits `PublicReader`.
    pub async fn can_access(
        &self,
        session: Option<&Session>,
        reference: &ResourceRef,
    ) -> StoreResult<bool> {
        Ok(self.resolve(session, reference).await?.has_access)
    }

    /// Whether the caller may modify the referenced resource.
    ///
    /// Excludes `PublicReader`.
    pub async fn can_edit(
        &self,
        session: Option<&Session>,
        reference: &ResourceRef,
    ) -> StoreResult<bool> {
        Ok(self.resolve(session, reference).await?.can_edit())
    }

    /// Resolve the ancestor chain, fetching only the ancestors the
    /// reference requires. Returns `None` when any node in the chain is
    /// missing.
    async fn resolve_chain(&self, reference: &ResourceRef) -> StoreResult<Option<AncestorChain>> {
        match reference {
            ResourceRef::Organization(id) => {
                let Some(organization) = self.store.organization(*id).await? else {
                    return Ok(None);
                };
                Ok(Some(AncestorChain {
                    organization_id: organization.id,
                    project_id: None,
                    city_id: None,
                    inventory: None,
                }))
            }
            ResourceRef::Project(id) => {
                let Some(project) = self.store.project(*id).await? else {
                    return Ok(None);
                };
                Ok(Some(AncestorChain {
                    organization_id: project.organization_id,
                    project_id: Some(project.id),
                    city_id: None,
                    inventory: None,
                }))
            }
            ResourceRef::City(id) => {
                let Some(city) = self.store.city(*id).await? else {
                    return Ok(None);
                };
                let Some(project) = self.store.project(city.project_id).await? else {
                    return Ok(None);
                };
                Ok(Some(AncestorChain {
                    organization_id: project.organization_id,
                    project_id: Some(project.id),
                    city_id: Some(city.id),
                    inventory: None,
                }))
            }
            ResourceRef::Inventory(id) => {
                let Some(inventory) = self.store.inventory(*id).await? else {
                    return Ok(None);
                };
                let Some(city) = self.store.city(inventory.city_id).await? else {
                    return Ok(None);
                };
                let Some(project) = self.store.project(city.project_id).await? else {
                    return Ok(None);
                };
                Ok(Some(AncestorChain {
                    organization_id: project.organization_id,
                    project_id: Some(project.id),
                    city_id: Some(city.id),
                    inventory: Some(inventory),
                }))
            }
        }
    }

    /// Whether an edge of the given kind covers the resolved chain.
    async fn edge_covers(
        &self,
        user_id: Uuid,
        kind: EdgeKind,
        chain: &AncestorChain,
    ) -> StoreResult<bool> {
        match kind {
            EdgeKind::OrganizationAdmin => {
                self.store
                    .is_organization_admin(user_id, chain.organization_id)
                    .await
            }
            EdgeKind::ProjectAdmin => match chain.project_id {
                Some(project_id) => self.store.is_project_admin(user_id, project_id).await,
                None => Ok(false),
            },
            EdgeKind::CityCollaborator => match chain.city_id {
                Some(city_id) => self.store.is_city_collaborator(user_id, city_id).await,
                None => Ok(false),
            },
        }
    }
}
