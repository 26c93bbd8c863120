//! Project domain model
//!
//! This module provides the Project entity for grouping cities within an
//! organization. Projects belong to exactly one organization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A project within an organization for grouping related cities.
///
/// Projects are the intermediate level of the resource tree: they belong
/// to exactly one organization and contain zero or more cities. A project
/// admin grant covers the project and everything beneath it.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use citygrid_org::Project;
///
/// let org_id = Uuid::now_v7();
/// let project = Project::new(org_id, "Coastal Cities 2025", "coastal-cities-2025");
/// assert_eq!(project.organization_id, org_id);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier for the project
    pub id: Uuid,

    /// Organization this project belongs to
    pub organization_id: Uuid,

    /// Human-readable name
    pub name: String,

    /// URL-friendly slug (unique within organization)
    pub slug: String,

    /// Project description
    pub description: Option<String>,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new project under an organization.
    ///
    /// # Arguments
    ///
    /// * `organization_id` - The parent organization
    /// * `name` - Project name
    /// * `slug` - URL-friendly slug (must be unique within organization)
    ///
    /// # Examples
    ///
    /// ```
    /// use uuid::Uuid;
    /// use citygrid_org::Project;
    ///
    /// let org_id = Uuid::now_v7();
    /// let project = Project::new(org_id, "Coastal Cities 2025", "coastal-cities-2025");
    /// ```
    pub fn new(organization_id: Uuid, name: impl Into<String>, slug: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            organization_id,
            name: name.into(),
            slug: slug.into(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the project description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_creation() {
        let org_id = Uuid::now_v7();
        let project = Project::new(org_id, "Coastal Cities 2025", "coastal-cities-2025");

        assert_eq!(project.organization_id, org_id);
        assert_eq!(project.name, "Coastal Cities 2025");
        assert!(project.description.is_none());
    }

    #[test]
    fn test_project_with_description() {
        let org_id = Uuid::now_v7();
        let project = Project::new(org_id, "Coastal Cities 2025", "coastal-cities-2025")
            .with_description("Pilot cohort for the 2025 reporting cycle");

        assert!(project.description.is_some());
    }
}
