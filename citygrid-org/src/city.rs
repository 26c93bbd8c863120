//! City domain model
//!
//! Cities are the data-entry unit of the platform. A city belongs to
//! exactly one project and owns its inventories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A city within a project.
///
/// Collaborator grants attach at this level: a `CityCollaborator` edge on
/// a city covers the city and its inventories, but never sibling cities
/// under the same project.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use citygrid_org::City;
///
/// let project_id = Uuid::now_v7();
/// let city = City::new(project_id, "Puerto Vallarta").with_geocode("MX 20 067");
/// assert_eq!(city.project_id, project_id);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    /// Unique identifier for the city
    pub id: Uuid,

    /// Project this city belongs to
    pub project_id: Uuid,

    /// Display name
    pub name: String,

    /// Geocode identifying the locality (e.g. a UN LOCODE)
    pub geocode: Option<String>,

    /// When the city was created
    pub created_at: DateTime<Utc>,

    /// When the city was last updated
    pub updated_at: DateTime<Utc>,
}

impl City {
    /// Creates a new city under a project.
    ///
    /// # Arguments
    ///
    /// * `project_id` - The parent project
    /// * `name` - Display name
    pub fn new(project_id: Uuid, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            project_id,
            name: name.into(),
            geocode: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the geocode for this city.
    pub fn with_geocode(mut self, geocode: impl Into<String>) -> Self {
        self.geocode = Some(geocode.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_creation() {
        let project_id = Uuid::now_v7();
        let city = City::new(project_id, "Puerto Vallarta");

        assert_eq!(city.project_id, project_id);
        assert_eq!(city.name, "Puerto Vallarta");
        assert!(city.geocode.is_none());
    }

    #[test]
    fn test_city_with_geocode() {
        let project_id = Uuid::now_v7();
        let city = City::new(project_id, "Puerto Vallarta").with_geocode("MX 20 067");

        assert_eq!(city.geocode.as_deref(), Some("MX 20 067"));
    }
}
