//! Role model
//!
//! This module defines the coarse global role carried by every session and
//! the resolved access role produced by permission resolution. Resolved
//! roles are hierarchical: each role inherits the reach of lower roles on
//! the subtree it covers.

use serde::{Deserialize, Serialize};

/// Coarse platform-wide role carried by a user account.
///
/// `Admin` bypasses all tree checks; everyone else is a regular `User`
/// whose access is decided by membership edges.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GlobalRole {
    /// Regular account, access decided by membership edges
    User,
    /// Platform operator, bypasses all tree checks
    Admin,
}

impl GlobalRole {
    /// Check if this role bypasses tree checks.
    pub fn is_admin(&self) -> bool {
        matches!(self, GlobalRole::Admin)
    }

    /// Parse role from string representation (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Get string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl Default for GlobalRole {
    fn default() -> Self {
        Self::User
    }
}

/// The role a caller holds over a specific resource reference.
///
/// Produced by permission resolution. The ordering is the tie-break rule:
/// a caller holding several grants that cover the same resource receives
/// the highest, and roles are never unioned across unrelated subtrees.
///
/// # Permission Model
///
/// - **NoAccess**: no grant covers the resource
/// - **PublicReader**: read-only on a single published inventory
/// - **Collaborator**: read/write on one city and its inventories
/// - **ProjectAdmin**: full access to one project's subtree
/// - **OrgAdmin**: full access to one organization's subtree
/// - **SystemAdmin**: full access everywhere (global `Admin` accounts)
///
/// # Examples
///
/// ```
/// use citygrid_access::AccessRole;
///
/// assert!(AccessRole::Collaborator.can_edit());
/// assert!(AccessRole::PublicReader.can_read());
/// assert!(!AccessRole::PublicReader.can_edit());
/// assert!(AccessRole::OrgAdmin > AccessRole::ProjectAdmin);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccessRole {
    /// No grant covers the resource
    NoAccess = 0,

    /// Read-only access to a single published inventory
    PublicReader = 1,

    /// Read/write access to a city and its inventories
    Collaborator = 2,

    /// Full access to a project's subtree
    ProjectAdmin = 3,

    /// Full access to an organization's subtree
    OrgAdmin = 4,

    /// Full access to every resource
    SystemAdmin = 5,
}

impl AccessRole {
    /// Check if this role grants read access.
    ///
    /// # Returns
    ///
    /// `true` for every role except NoAccess
    pub fn can_read(&self) -> bool {
        *self >= AccessRole::PublicReader
    }

    /// Check if this role grants write access.
    ///
    /// PublicReader is read-only; every membership-derived role and
    /// SystemAdmin can write.
    ///
    /// # Returns
    ///
    /// `true` for Collaborator, ProjectAdmin, OrgAdmin, and SystemAdmin
    pub fn can_edit(&self) -> bool {
        *self >= AccessRole::Collaborator
    }

    /// Parse role from string representation (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "no_access" => Some(Self::NoAccess),
            "public_reader" => Some(Self::PublicReader),
            "collaborator" => Some(Self::Collaborator),
            "project_admin" => Some(Self::ProjectAdmin),
            "org_admin" => Some(Self::OrgAdmin),
            "system_admin" => Some(Self::SystemAdmin),
            _ => None,
        }
    }

    /// Get string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoAccess => "no_access",
            Self::PublicReader => "public_reader",
            Self::Collaborator => "collaborator",
            Self::ProjectAdmin => "project_admin",
            Self::OrgAdmin => "org_admin",
            Self::SystemAdmin => "system_admin",
        }
    }

    /// Get a human-readable display name for the role.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::NoAccess => "No Access",
            Self::PublicReader => "Public Reader",
            Self::Collaborator => "Collaborator",
            Self::ProjectAdmin => "Project Admin",
            Self::OrgAdmin => "Organization Admin",
            Self::SystemAdmin => "System Admin",
        }
    }
}

impl Default for AccessRole {
    fn default() -> Self {
        Self::NoAccess
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_hierarchy() {
        assert!(AccessRole::SystemAdmin > AccessRole::OrgAdmin);
        assert!(AccessRole::OrgAdmin > AccessRole::ProjectAdmin);
        assert!(AccessRole::ProjectAdmin > AccessRole::Collaborator);
        assert!(AccessRole::Collaborator > AccessRole::PublicReader);
        assert!(AccessRole::PublicReader > AccessRole::NoAccess);
    }

    #[test]
    fn test_read_permissions() {
        assert!(!AccessRole::NoAccess.can_read());
        assert!(AccessRole::PublicReader.can_read());
        assert!(AccessRole::Collaborator.can_read());
        assert!(AccessRole::SystemAdmin.can_read());
    }

    #[test]
    fn test_edit_excludes_public_reader() {
        assert!(!AccessRole::NoAccess.can_edit());
        assert!(!AccessRole::PublicReader.can_edit());
        assert!(AccessRole::Collaborator.can_edit());
        assert!(AccessRole::ProjectAdmin.can_edit());
        assert!(AccessRole::OrgAdmin.can_edit());
        assert!(AccessRole::SystemAdmin.can_edit());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(AccessRole::parse("org_admin"), Some(AccessRole::OrgAdmin));
        assert_eq!(
            AccessRole::parse("PUBLIC_READER"),
            Some(AccessRole::PublicReader)
        );
        assert_eq!(AccessRole::parse("invalid"), None);
    }

    #[test]
    fn test_global_role_parse() {
        assert_eq!(GlobalRole::parse("admin"), Some(GlobalRole::Admin));
        assert_eq!(GlobalRole::parse("USER"), Some(GlobalRole::User));
        assert_eq!(GlobalRole::parse("root"), None);
    }

    #[test]
    fn test_global_admin() {
        assert!(GlobalRole::Admin.is_admin());
        assert!(!GlobalRole::User.is_admin());
    }
}
