//! Inventory domain model
//!
//! An inventory is a per-city reporting dataset for a single year. It is
//! the leaf of the resource tree and the only node that can be made
//! publicly readable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reporting inventory belonging to a city.
///
/// Inventories are created private. Publishing one grants read-only
/// access to any caller, including anonymous ones; it never grants write
/// access.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use citygrid_org::Inventory;
///
/// let city_id = Uuid::now_v7();
/// let mut inventory = Inventory::new(city_id, "GPC BASIC 2025", 2025);
/// assert!(!inventory.is_public);
///
/// inventory.publish();
/// assert!(inventory.is_public);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    /// Unique identifier for the inventory
    pub id: Uuid,

    /// City this inventory belongs to
    pub city_id: Uuid,

    /// Display name
    pub name: String,

    /// Reporting year
    pub year: i32,

    /// Whether the inventory is publicly readable
    pub is_public: bool,

    /// When the inventory was created
    pub created_at: DateTime<Utc>,

    /// When the inventory was last updated
    pub updated_at: DateTime<Utc>,
}

impl Inventory {
    /// Creates a new private inventory under a city.
    ///
    /// # Arguments
    ///
    /// * `city_id` - The parent city
    /// * `name` - Display name
    /// * `year` - Reporting year
    pub fn new(city_id: Uuid, name: impl Into<String>, year: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            city_id,
            name: name.into(),
            year,
            is_public: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Make the inventory publicly readable.
    pub fn publish(&mut self) {
        self.is_public = true;
        self.updated_at = Utc::now();
    }

    /// Make the inventory private again.
    pub fn unpublish(&mut self) {
        self.is_public = false;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_created_private() {
        let city_id = Uuid::now_v7();
        let inventory = Inventory::new(city_id, "GPC BASIC 2025", 2025);

        assert_eq!(inventory.city_id, city_id);
        assert_eq!(inventory.year, 2025);
        assert!(!inventory.is_public);
    }

    #[test]
    fn test_publish_and_unpublish() {
        let city_id = Uuid::now_v7();
        let mut inventory = Inventory::new(city_id, "GPC BASIC 2025", 2025);

        inventory.publish();
        assert!(inventory.is_public);

        inventory.unpublish();
        assert!(!inventory.is_public);
    }
}
