//! Membership precedence
//!
//! The order in which membership edges are consulted during resolution is
//! data, not control flow: an ordered list of `(EdgeKind, AccessRole)`
//! pairs scanned strongest grant first. A caller holding several edges
//! that cover the same resource receives the first (highest) matching
//! role.

use serde::{Deserialize, Serialize};

use crate::roles::AccessRole;

/// The three kinds of membership edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// `OrganizationAdmin(user, organization)`
    OrganizationAdmin,
    /// `ProjectAdmin(user, project)`
    ProjectAdmin,
    /// `CityCollaborator(user, city)`
    CityCollaborator,
}

impl EdgeKind {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::OrganizationAdmin => "organization_admin",
            EdgeKind::ProjectAdmin => "project_admin",
            EdgeKind::CityCollaborator => "city_collaborator",
        }
    }
}

/// Edge kinds and the roles they confer, strongest first.
///
/// The resolver scans this table in order and returns the first grant
/// that exists for the resolved ancestor chain.
pub const MEMBERSHIP_PRECEDENCE: &[(EdgeKind, AccessRole)] = &[
    (EdgeKind::OrganizationAdmin, AccessRole::OrgAdmin),
    (EdgeKind::ProjectAdmin, AccessRole::ProjectAdmin),
    (EdgeKind::CityCollaborator, AccessRole::Collaborator),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_is_strictly_descending() {
        for pair in MEMBERSHIP_PRECEDENCE.windows(2) {
            assert!(pair[0].1 > pair[1].1, "{:?} must outrank {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_every_edge_kind_listed_once() {
        let kinds: Vec<EdgeKind> = MEMBERSHIP_PRECEDENCE.iter().map(|(k, _)| *k).collect();

        assert_eq!(kinds.len(), 3);
        assert!(kinds.contains(&EdgeKind::OrganizationAdmin));
        assert!(kinds.contains(&EdgeKind::ProjectAdmin));
        assert!(kinds.contains(&EdgeKind::CityCollaborator));
    }

    #[test]
    fn test_no_entry_confers_public_or_system_role() {
        for (_, role) in MEMBERSHIP_PRECEDENCE {
            assert!(*role > AccessRole::PublicReader);
            assert!(*role < AccessRole::SystemAdmin);
        }
    }
}
