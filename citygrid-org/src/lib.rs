//! # CityGrid Resource Tree
//!
//! This crate provides the multi-tenant resource tree for the CityGrid
//! platform, shared across the data-entry and reporting services.
//!
//! ## Overview
//!
//! The citygrid-org crate handles:
//! - **Organizations**: Top-level tenant entities
//! - **Projects**: Groupings of cities within an organization
//! - **Cities**: The data-entry unit, optionally geocoded
//! - **Inventories**: Per-city reporting datasets with a public flag
//! - **Memberships**: The three grant edges tying users to tree nodes
//! - **Context**: A user's current and default resources
//!
//! ## Architecture
//!
//! ```text
//! Organization
//!   └─ Project
//!        └─ City ──────────── CityCollaborator ─→ User
//!             └─ Inventory (is_public)
//! ```
//!
//! Every non-root node has exactly one parent; the chain
//! Inventory → City → Project → Organization is always resolvable or the
//! node is treated as missing by the access layer.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use citygrid_org::{Organization, Project, City, Inventory, ResourceRef};
//! use uuid::Uuid;
//!
//! let owner_id = Uuid::now_v7();
//! let org = Organization::new("Pacific Alliance", "pacific-alliance", owner_id);
//! let project = Project::new(org.id, "Coastal Cities 2025", "coastal-cities-2025");
//! let city = City::new(project.id, "Puerto Vallarta");
//! let inventory = Inventory::new(city.id, "GPC BASIC 2025", 2025);
//!
//! let reference = ResourceRef::Inventory(inventory.id);
//! assert_eq!(reference.id(), inventory.id);
//! ```
//!
//! ## Cross-Crate Integration
//!
//! This crate is designed to work with:
//! - `citygrid-access`: Hierarchical permission resolution
//! - `citygrid-auth`: Token-based authentication
//! - `citygrid-invite`: The invitation lifecycle

pub mod city;
pub mod context;
pub mod inventory;
pub mod membership;
pub mod organization;
pub mod project;
pub mod resource;

// Re-export main types for convenience
pub use city::City;
pub use context::UserContext;
pub use inventory::Inventory;
pub use membership::{CityCollaborator, MembershipEdge, OrganizationAdmin, ProjectAdmin};
pub use organization::Organization;
pub use project::Project;
pub use resource::{ResourceKind, ResourceRef};
