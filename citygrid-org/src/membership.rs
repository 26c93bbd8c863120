//! Membership edge records
//!
//! This module provides the three grant edges tying users to nodes of the
//! resource tree. Edges are owned by the resource side and mutated only by
//! the invitation lifecycle engine or direct admin action.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Organization admin edge.
///
/// Grants full access to the organization and everything beneath it.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use citygrid_org::OrganizationAdmin;
///
/// let org_id = Uuid::now_v7();
/// let user_id = Uuid::now_v7();
/// let edge = OrganizationAdmin::new(org_id, user_id);
/// assert_eq!(edge.organization_id, org_id);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationAdmin {
    /// Unique edge ID
    pub id: Uuid,

    /// Organization ID
    pub organization_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Who invited this user (if the edge came from an invitation)
    pub invited_by: Option<Uuid>,

    /// When the edge was created
    pub added_at: DateTime<Utc>,
}

impl OrganizationAdmin {
    /// Creates a new organization admin edge.
    pub fn new(organization_id: Uuid, user_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            organization_id,
            user_id,
            invited_by: None,
            added_at: Utc::now(),
        }
    }

    /// Set who invited this user.
    pub fn with_inviter(mut self, inviter_id: Uuid) -> Self {
        self.invited_by = Some(inviter_id);
        self
    }
}

/// Project admin edge.
///
/// Grants full access to the project and everything beneath it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectAdmin {
    /// Unique edge ID
    pub id: Uuid,

    /// Project ID
    pub project_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Who invited this user (if the edge came from an invitation)
    pub invited_by: Option<Uuid>,

    /// When the edge was created
    pub added_at: DateTime<Utc>,
}

impl ProjectAdmin {
    /// Creates a new project admin edge.
    pub fn new(project_id: Uuid, user_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            project_id,
            user_id,
            invited_by: None,
            added_at: Utc::now(),
        }
    }

    /// Set who invited this user.
    pub fn with_inviter(mut self, inviter_id: Uuid) -> Self {
        self.invited_by = Some(inviter_id);
        self
    }
}

/// City collaborator edge.
///
/// Grants read/write access to the city and its inventories, not to
/// sibling cities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityCollaborator {
    /// Unique edge ID
    pub id: Uuid,

    /// City ID
    pub city_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Who invited this user (if the edge came from an invitation)
    pub invited_by: Option<Uuid>,

    /// When the edge was created
    pub added_at: DateTime<Utc>,
}

impl CityCollaborator {
    /// Creates a new city collaborator edge.
    pub fn new(city_id: Uuid, user_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            city_id,
            user_id,
            invited_by: None,
            added_at: Utc::now(),
        }
    }

    /// Set who invited this user.
    pub fn with_inviter(mut self, inviter_id: Uuid) -> Self {
        self.invited_by = Some(inviter_id);
        self
    }
}

/// A membership edge of any kind.
///
/// Used by the invitation lifecycle engine as the payload of its
/// transactional writes: accepting an invitation creates exactly one of
/// these, canceling an accepted invitation removes it again.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MembershipEdge {
    /// Organization admin grant
    OrganizationAdmin(OrganizationAdmin),
    /// Project admin grant
    ProjectAdmin(ProjectAdmin),
    /// City collaborator grant
    CityCollaborator(CityCollaborator),
}

impl MembershipEdge {
    /// The user this edge grants access to.
    pub fn user_id(&self) -> Uuid {
        match self {
            MembershipEdge::OrganizationAdmin(edge) => edge.user_id,
            MembershipEdge::ProjectAdmin(edge) => edge.user_id,
            MembershipEdge::CityCollaborator(edge) => edge.user_id,
        }
    }

    /// The tree node this edge attaches to.
    pub fn resource_id(&self) -> Uuid {
        match self {
            MembershipEdge::OrganizationAdmin(edge) => edge.organization_id,
            MembershipEdge::ProjectAdmin(edge) => edge.project_id,
            MembershipEdge::CityCollaborator(edge) => edge.city_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_admin_creation() {
        let org_id = Uuid::now_v7();
        let user_id = Uuid::now_v7();
        let edge = OrganizationAdmin::new(org_id, user_id);

        assert_eq!(edge.organization_id, org_id);
        assert_eq!(edge.user_id, user_id);
        assert!(edge.invited_by.is_none());
    }

    #[test]
    fn test_edge_with_inviter() {
        let city_id = Uuid::now_v7();
        let user_id = Uuid::now_v7();
        let inviter_id = Uuid::now_v7();

        let edge = CityCollaborator::new(city_id, user_id).with_inviter(inviter_id);

        assert_eq!(edge.invited_by, Some(inviter_id));
    }

    #[test]
    fn test_membership_edge_accessors() {
        let project_id = Uuid::now_v7();
        let user_id = Uuid::now_v7();
        let edge = MembershipEdge::ProjectAdmin(ProjectAdmin::new(project_id, user_id));

        assert_eq!(edge.user_id(), user_id);
        assert_eq!(edge.resource_id(), project_id);
    }
}
