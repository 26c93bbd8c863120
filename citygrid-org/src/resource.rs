//! Resource references
//!
//! This module defines the tagged reference type used by the access layer
//! to name exactly one node in the resource tree. Handlers resolve the
//! most specific identifier a caller supplied into a `ResourceRef` once,
//! at the request boundary; everything downstream works with the single
//! populated variant instead of inspecting four optional fields.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The four node kinds of the resource tree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Top-level tenant
    Organization,
    /// Grouping of cities within an organization
    Project,
    /// Data-entry unit within a project
    City,
    /// Per-city reporting dataset
    Inventory,
}

impl ResourceKind {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Organization => "organization",
            ResourceKind::Project => "project",
            ResourceKind::City => "city",
            ResourceKind::Inventory => "inventory",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "organization" => Some(ResourceKind::Organization),
            "project" => Some(ResourceKind::Project),
            "city" => Some(ResourceKind::City),
            "inventory" => Some(ResourceKind::Inventory),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reference to exactly one node in the resource tree.
///
/// This is the input to permission resolution and the scope carrier for
/// invitations. The variant records which level of the tree the caller
/// addressed; the access layer walks parents from here as needed.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use citygrid_org::{ResourceKind, ResourceRef};
///
/// let id = Uuid::now_v7();
/// let reference = ResourceRef::City(id);
/// assert_eq!(reference.kind(), ResourceKind::City);
/// assert_eq!(reference.id(), id);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ResourceRef {
    /// Reference to an organization
    Organization(Uuid),
    /// Reference to a project
    Project(Uuid),
    /// Reference to a city
    City(Uuid),
    /// Reference to an inventory
    Inventory(Uuid),
}

impl ResourceRef {
    /// The node kind this reference addresses.
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceRef::Organization(_) => ResourceKind::Organization,
            ResourceRef::Project(_) => ResourceKind::Project,
            ResourceRef::City(_) => ResourceKind::City,
            ResourceRef::Inventory(_) => ResourceKind::Inventory,
        }
    }

    /// The referenced node id.
    pub fn id(&self) -> Uuid {
        match self {
            ResourceRef::Organization(id)
            | ResourceRef::Project(id)
            | ResourceRef::City(id)
            | ResourceRef::Inventory(id) => *id,
        }
    }
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_id() {
        let id = Uuid::now_v7();

        assert_eq!(ResourceRef::Organization(id).kind(), ResourceKind::Organization);
        assert_eq!(ResourceRef::Project(id).kind(), ResourceKind::Project);
        assert_eq!(ResourceRef::City(id).kind(), ResourceKind::City);
        assert_eq!(ResourceRef::Inventory(id).kind(), ResourceKind::Inventory);
        assert_eq!(ResourceRef::Inventory(id).id(), id);
    }

    #[test]
    fn test_kind_parse_round_trip() {
        for kind in [
            ResourceKind::Organization,
            ResourceKind::Project,
            ResourceKind::City,
            ResourceKind::Inventory,
        ] {
            assert_eq!(ResourceKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ResourceKind::parse("team"), None);
    }

    #[test]
    fn test_display() {
        let id = Uuid::now_v7();
        let reference = ResourceRef::City(id);

        assert_eq!(reference.to_string(), format!("city:{}", id));
    }
}
