//! User context for city and inventory switching
//!
//! This module provides the UserContext type that tracks a user's current
//! working context within the platform: the city and inventory their
//! session points at, plus recent access history.
//!
//! The *default* fields matter to the invitation lifecycle: revoking a
//! user's access to their default city must reassign the default to a
//! resource they can still reach, or clear it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of recent cities retained per user.
const MAX_RECENT_CITIES: usize = 10;

/// A user's current working context (selected city and inventory).
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use citygrid_org::UserContext;
///
/// let user_id = Uuid::now_v7();
/// let mut ctx = UserContext::new(user_id);
///
/// let city_id = Uuid::now_v7();
/// ctx.switch_city(city_id);
/// assert_eq!(ctx.default_city_id, Some(city_id));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContext {
    /// User ID
    pub user_id: Uuid,

    /// The city the user's session currently points at
    pub default_city_id: Option<Uuid>,

    /// The inventory the user's session currently points at
    pub default_inventory_id: Option<Uuid>,

    /// Recently accessed cities (most recent first)
    #[serde(default)]
    pub recent_cities: Vec<Uuid>,

    /// Last updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl UserContext {
    /// Creates a new user context with no selected city or inventory.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            default_city_id: None,
            default_inventory_id: None,
            recent_cities: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Switch to a different city.
    ///
    /// Clears the selected inventory (inventories belong to cities) and
    /// records the city in recent history.
    pub fn switch_city(&mut self, city_id: Uuid) {
        self.default_city_id = Some(city_id);
        self.default_inventory_id = None;
        self.add_recent_city(city_id);
        self.updated_at = Utc::now();
    }

    /// Switch to a different inventory.
    ///
    /// The caller is responsible for ensuring the inventory belongs to the
    /// currently selected city.
    pub fn switch_inventory(&mut self, inventory_id: Uuid) {
        self.default_inventory_id = Some(inventory_id);
        self.updated_at = Utc::now();
    }

    /// Clear the selected city and inventory.
    ///
    /// Used when a user's last remaining grant is revoked and no fallback
    /// resource exists.
    pub fn clear_defaults(&mut self) {
        self.default_city_id = None;
        self.default_inventory_id = None;
        self.updated_at = Utc::now();
    }

    /// Whether this context currently points at the given city.
    pub fn points_at_city(&self, city_id: Uuid) -> bool {
        self.default_city_id == Some(city_id)
    }

    /// Get the most recent cities.
    ///
    /// # Arguments
    ///
    /// * `limit` - Maximum number of cities to return
    pub fn get_recent_cities(&self, limit: usize) -> &[Uuid] {
        let end = limit.min(self.recent_cities.len());
        &self.recent_cities[..end]
    }

    fn add_recent_city(&mut self, city_id: Uuid) {
        self.recent_cities.retain(|id| *id != city_id);
        self.recent_cities.insert(0, city_id);
        self.recent_cities.truncate(MAX_RECENT_CITIES);
    }
}
