//! Membership store abstraction
//!
//! This module defines the read side of the relational collaborator the
//! resolver depends on: point lookups for resource-tree ancestry and
//! existence checks for the three membership edges. An in-memory
//! implementation backs tests and single-process deployments.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use citygrid_org::{City, Inventory, Organization, Project};

/// Membership store error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A query failed
    #[error("query failed: {0}")]
    Query(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Read access to the resource tree and membership edges.
///
/// The resolver fetches only the ancestors a reference requires and stops
/// scanning as soon as a sufficient grant is found, so implementations
/// should keep each method a cheap point lookup.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Fetch an organization by id.
    async fn organization(&self, id: Uuid) -> StoreResult<Option<Organization>>;

    /// Fetch a project by id.
    async fn project(&self, id: Uuid) -> StoreResult<Option<Project>>;

    /// Fetch a city by id.
    async fn city(&self, id: Uuid) -> StoreResult<Option<City>>;

    /// Fetch an inventory by id.
    async fn inventory(&self, id: Uuid) -> StoreResult<Option<Inventory>>;

    /// Whether an `OrganizationAdmin(user, organization)` edge exists.
    async fn is_organization_admin(&self, user_id: Uuid, organization_id: Uuid)
        -> StoreResult<bool>;

    /// Whether a `ProjectAdmin(user, project)` edge exists.
    async fn is_project_admin(&self, user_id: Uuid, project_id: Uuid) -> StoreResult<bool>;

    /// Whether a `CityCollaborator(user, city)` edge exists.
    async fn is_city_collaborator(&self, user_id: Uuid, city_id: Uuid) -> StoreResult<bool>;
}

/// In-memory membership store.
///
/// Suitable for single-process deployments and testing. Tree nodes and
/// edges are held in `RwLock`-guarded maps; a lookup counter makes the
/// resolver's no-query guarantees observable in tests.
#[derive(Default)]
pub struct MemoryMembershipStore {
    organizations: RwLock<HashMap<Uuid, Organization>>,
    projects: RwLock<HashMap<Uuid, Project>>,
    cities: RwLock<HashMap<Uuid, City>>,
    inventories: RwLock<HashMap<Uuid, Inventory>>,
    org_admins: RwLock<HashSet<(Uuid, Uuid)>>,
    project_admins: RwLock<HashSet<(Uuid, Uuid)>>,
    city_collaborators: RwLock<HashSet<(Uuid, Uuid)>>,
    lookups: AtomicU64,
}

impl std::fmt::Debug for MemoryMembershipStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryMembershipStore")
            .field("lookups", &self.lookups.load(Ordering::Relaxed))
            .finish()
    }
}

impl MemoryMembershipStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store wrapped in an `Arc`.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of lookups served since construction.
    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }

    fn record_lookup(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    /// Insert an organization.
    pub async fn insert_organization(&self, organization: Organization) {
        self.organizations
            .write()
            .await
            .insert(organization.id, organization);
    }

    /// Insert a project.
    pub async fn insert_project(&self, project: Project) {
        self.projects.write().await.insert(project.id, project);
    }

    /// Insert a city.
    pub async fn insert_city(&self, city: City) {
        self.cities.write().await.insert(city.id, city);
    }

    /// Insert an inventory.
    pub async fn insert_inventory(&self, inventory: Inventory) {
        self.inventories
            .write()
            .await
            .insert(inventory.id, inventory);
    }

    /// Grant an `OrganizationAdmin` edge.
    pub async fn grant_organization_admin(&self, user_id: Uuid, organization_id: Uuid) {
        self.org_admins
            .write()
            .await
            .insert((user_id, organization_id));
    }

    /// Grant a `ProjectAdmin` edge.
    pub async fn grant_project_admin(&self, user_id: Uuid, project_id: Uuid) {
        self.project_admins
            .write()
            .await
            .insert((user_id, project_id));
    }

    /// Grant a `CityCollaborator` edge.
    pub async fn grant_city_collaborator(&self, user_id: Uuid, city_id: Uuid) {
        self.city_collaborators
            .write()
            .await
            .insert((user_id, city_id));
    }

    /// Revoke an `OrganizationAdmin` edge.
    pub async fn revoke_organization_admin(&self, user_id: Uuid, organization_id: Uuid) {
        self.org_admins
            .write()
            .await
            .remove(&(user_id, organization_id));
    }

    /// Revoke a `ProjectAdmin` edge.
    pub async fn revoke_project_admin(&self, user_id: Uuid, project_id: Uuid) {
        self.project_admins
            .write()
            .await
            .remove(&(user_id, project_id));
    }

    /// Revoke a `CityCollaborator` edge.
    pub async fn revoke_city_collaborator(&self, user_id: Uuid, city_id: Uuid) {
        self.city_collaborators
            .write()
            .await
            .remove(&(user_id, city_id));
    }

    /// Cities the user holds a `CityCollaborator` edge on, sorted for
    /// deterministic iteration.
    pub async fn collaborator_cities(&self, user_id: Uuid) -> Vec<Uuid> {
        let mut cities: Vec<Uuid> = self
            .city_collaborators
            .read()
            .await
            .iter()
            .filter(|(user, _)| *user == user_id)
            .map(|(_, city)| *city)
            .collect();
        cities.sort();
        cities
    }
}

#[async_trait]
impl MembershipStore for MemoryMembershipStore {
    async fn organization(&self, id: Uuid) -> StoreResult<Option<Organization>> {
        self.record_lookup();
        Ok(self.organizations.read().await.get(&id).cloned())
    }

    async fn project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        self.record_lookup();
        Ok(self.projects.read().await.get(&id).cloned())
    }

    async fn city(&self, id: Uuid) -> StoreResult<Option<City>> {
        self.record_lookup();
        Ok(self.cities.read().await.get(&id).cloned())
    }

    async fn inventory(&self, id: Uuid) -> StoreResult<Option<Inventory>> {
        self.record_lookup();
        Ok(self.inventories.read().await.get(&id).cloned())
    }

    async fn is_organization_admin(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> StoreResult<bool> {
        self.record_lookup();
        Ok(self
            .org_admins
            .read()
            .await
            .contains(&(user_id, organization_id)))
    }

    async fn is_project_admin(&self, user_id: Uuid, project_id: Uuid) -> StoreResult<bool> {
        self.record_lookup();
        Ok(self
            .project_admins
            .read()
            .await
            .contains(&(user_id, project_id)))
    }

    async fn is_city_collaborator(&self, user_id: Uuid, city_id: Uuid) -> StoreResult<bool> {
        self.record_lookup();
        Ok(self
            .city_collaborators
            .read()
            .await
            .contains(&(user_id, city_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tree_lookups() {
        let store = MemoryMembershipStore::new();

        let org = Organization::new("Org", "org", Uuid::now_v7());
        let project = Project::new(org.id, "Project", "project");
        store.insert_organization(org.clone()).await;
        store.insert_project(project.clone()).await;

        assert!(store.organization(org.id).await.unwrap().is_some());
        assert_eq!(
            store.project(project.id).await.unwrap().unwrap().organization_id,
            org.id
        );
        assert!(store.city(Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_edge_grant_and_revoke() {
        let store = MemoryMembershipStore::new();
        let user_id = Uuid::now_v7();
        let city_id = Uuid::now_v7();

        assert!(!store.is_city_collaborator(user_id, city_id).await.unwrap());

        store.grant_city_collaborator(user_id, city_id).await;
        assert!(store.is_city_collaborator(user_id, city_id).await.unwrap());

        store.revoke_city_collaborator(user_id, city_id).await;
        assert!(!store.is_city_collaborator(user_id, city_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_lookup_counter() {
        let store = MemoryMembershipStore::new();
        assert_eq!(store.lookup_count(), 0);

        let _ = store.organization(Uuid::now_v7()).await;
        let _ = store.is_project_admin(Uuid::now_v7(), Uuid::now_v7()).await;

        assert_eq!(store.lookup_count(), 2);
    }
}
