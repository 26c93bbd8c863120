//! # CityGrid Access Control
//!
//! This crate provides hierarchical permission resolution for the
//! CityGrid platform: given a caller's session (or none) and a reference
//! to one node of the resource tree, it decides whether the caller may
//! read or write that node.
//!
//! ## Overview
//!
//! The citygrid-access crate handles:
//! - **Roles**: The global role on accounts and the resolved access role
//! - **Sessions**: The ephemeral caller identity (cookie- or token-derived)
//! - **Precedence**: Membership edge kinds ordered strongest grant first
//! - **Resolution**: The tree walk + precedence scan producing a decision
//! - **Stores**: The membership-store trait and an in-memory backend
//!
//! ## Resolution model
//!
//! ```text
//! resolve(session, ref)
//!   ├─ global Admin?            → SystemAdmin, no queries
//!   ├─ ancestor chain missing?  → NoAccess
//!   ├─ OrganizationAdmin edge?  → OrgAdmin      (whole org subtree)
//!   ├─ ProjectAdmin edge?       → ProjectAdmin  (project subtree)
//!   ├─ CityCollaborator edge?   → Collaborator  (one city + inventories)
//!   ├─ published inventory?     → PublicReader  (read-only, even anonymous)
//!   └─ otherwise                → NoAccess
//! ```
//!
//! Denial is always a value (`has_access = false`), never an error; the
//! request layer translates it into 401 or 403 depending on whether a
//! session was present.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use citygrid_access::{MemoryMembershipStore, PermissionResolver};
//! use citygrid_org::ResourceRef;
//! use uuid::Uuid;
//!
//! # async fn demo() -> Result<(), citygrid_access::StoreError> {
//! let store = MemoryMembershipStore::shared();
//! let resolver = PermissionResolver::new(store.clone());
//!
//! let city_id = Uuid::now_v7();
//! let writable = resolver.can_edit(None, &ResourceRef::City(city_id)).await?;
//! assert!(!writable);
//! # Ok(())
//! # }
//! ```

pub mod precedence;
pub mod resolver;
pub mod roles;
pub mod session;
pub mod store;

// Re-export main types for convenience
pub use precedence::{EdgeKind, MEMBERSHIP_PRECEDENCE};
pub use resolver::{AccessDecision, PermissionResolver};
pub use roles::{AccessRole, GlobalRole};
pub use session::Session;
pub use store::{MembershipStore, MemoryMembershipStore, StoreError, StoreResult};
