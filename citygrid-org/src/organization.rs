//! Organization domain model
//!
//! This module provides the core Organization entity for multi-tenant
//! resource management. Organizations are the top-level tenant entities
//! that contain projects, and through them cities and inventories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// An organization represents a tenant in the multi-tenant system.
///
/// Users can belong to multiple organizations with different grants.
/// Each organization owns a set of projects; everything beneath a project
/// (cities, inventories) belongs to exactly one organization through its
/// parent chain.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use citygrid_org::Organization;
///
/// let owner_id = Uuid::now_v7();
/// let org = Organization::new("Pacific Alliance", "pacific-alliance", owner_id);
/// assert_eq!(org.name, "Pacific Alliance");
/// assert!(org.is_active);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    /// Unique identifier for the organization
    pub id: Uuid,

    /// Human-readable name
    pub name: String,

    /// URL-friendly slug (unique across platform)
    pub slug: String,

    /// Contact email for the tenant account
    pub contact_email: Option<String>,

    /// Owner user ID (the user who created the org)
    pub owner_id: Uuid,

    /// Maximum number of cities this tenant may create.
    ///
    /// Enforced at city creation by the data-entry service; the access
    /// layer does not consult it.
    pub city_limit: Option<u32>,

    /// Whether the organization is active
    pub is_active: bool,

    /// When the organization was created
    pub created_at: DateTime<Utc>,

    /// When the organization was last updated
    pub updated_at: DateTime<Utc>,

    /// Custom metadata for extensibility
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Organization {
    /// Creates a new active organization.
    ///
    /// The organization is created with:
    /// - A newly generated UUID v7 ID
    /// - Active status
    /// - No city limit
    /// - Current timestamp for created_at and updated_at
    ///
    /// # Arguments
    ///
    /// * `name` - The organization name
    /// * `slug` - URL-friendly slug (must be unique)
    /// * `owner_id` - The user ID who owns this organization
    ///
    /// # Examples
    ///
    /// ```
    /// use uuid::Uuid;
    /// use citygrid_org::Organization;
    ///
    /// let owner_id = Uuid::now_v7();
    /// let org = Organization::new("Pacific Alliance", "pacific-alliance", owner_id);
    /// ```
    pub fn new(name: impl Into<String>, slug: impl Into<String>, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            slug: slug.into(),
            contact_email: None,
            owner_id,
            city_limit: None,
            is_active: true,
            created_at: now,
            updated_at: now,
            metadata: HashMap::new(),
        }
    }

    /// Set the contact email.
    pub fn with_contact_email(mut self, email: impl Into<String>) -> Self {
        self.contact_email = Some(email.into());
        self
    }

    /// Cap the number of cities this tenant may create.
    pub fn with_city_limit(mut self, limit: u32) -> Self {
        self.city_limit = Some(limit);
        self
    }

    /// Check whether another city may be created given the current count.
    ///
    /// # Arguments
    ///
    /// * `current_count` - Number of cities the tenant already has
    ///
    /// # Returns
    ///
    /// `true` when no limit is set or the limit has not been reached
    pub fn can_add_city(&self, current_count: u32) -> bool {
        match self.city_limit {
            Some(limit) => current_count < limit,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_creation() {
        let owner_id = Uuid::now_v7();
        let org = Organization::new("Pacific Alliance", "pacific-alliance", owner_id);

        assert_eq!(org.name, "Pacific Alliance");
        assert_eq!(org.slug, "pacific-alliance");
        assert_eq!(org.owner_id, owner_id);
        assert!(org.is_active);
        assert!(org.city_limit.is_none());
    }

    #[test]
    fn test_city_limit() {
        let owner_id = Uuid::now_v7();
        let org = Organization::new("Test", "test", owner_id).with_city_limit(2);

        assert!(org.can_add_city(0));
        assert!(org.can_add_city(1));
        assert!(!org.can_add_city(2));
    }

    #[test]
    fn test_unlimited_cities_by_default() {
        let owner_id = Uuid::now_v7();
        let org = Organization::new("Test", "test", owner_id);

        assert!(org.can_add_city(u32::MAX - 1));
    }
}
