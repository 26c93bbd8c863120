//! # CityGrid Invitations
//!
//! This crate provides the invitation lifecycle for the CityGrid
//! platform: the token-based workflow through which users are added to
//! organizations, projects, and cities, and through which those grants
//! are revoked again.
//!
//! ## Overview
//!
//! The citygrid-invite crate handles:
//! - **Invitations**: Resource-scoped records with an explicit state
//!   machine (pending, accepted, canceled, expired)
//! - **The engine**: issue / accept / cancel / resend, with signed
//!   tokens, transactional membership writes, and cascading
//!   default-resource reassignment on revocation
//! - **Stores**: The invite-store trait whose commit operations are
//!   atomic, plus an in-memory implementation
//! - **Mail boundary**: The outbound-email collaborator trait
//!
//! ## Lifecycle
//!
//! ```text
//! issue ─→ Pending ──accept──→ Accepted ──cancel──→ Canceled
//!            │ ▲                                       │
//!       cancel resend ─────────────────────────────────┘
//!            ▼ │
//!          Canceled        Pending ──(expired token at accept)──→ Expired
//! ```
//!
//! Acceptance is single-use: once an invitation leaves `Pending`, a
//! replayed token fails even though its signature still verifies, and
//! every resend mints a fresh token.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use citygrid_access::MemoryMembershipStore;
//! use citygrid_auth::TokenCodec;
//! use citygrid_invite::{InvitationEngine, InviteScope, MemoryInviteStore, RecordingMailer};
//! use uuid::Uuid;
//!
//! # async fn demo(session: citygrid_access::Session) -> citygrid_auth::AuthResult<()> {
//! let membership = MemoryMembershipStore::shared();
//! let engine = InvitationEngine::new(
//!     TokenCodec::from_env()?,
//!     MemoryInviteStore::shared(membership.clone()),
//!     membership,
//!     RecordingMailer::shared(),
//!     "https://app.citygrid.dev/invites/accept",
//! );
//!
//! let city_id = Uuid::now_v7();
//! engine
//!     .issue(Some(&session), InviteScope::City(city_id), "maria@example.com")
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Cross-Crate Integration
//!
//! This crate integrates with:
//! - `citygrid-org`: Membership edges and user contexts
//! - `citygrid-access`: The resolver authorizing issuing callers
//! - `citygrid-auth`: The signed-token codec and error taxonomy

pub mod engine;
pub mod invitation;
pub mod mailer;
pub mod store;

// Re-export main types for convenience
pub use engine::InvitationEngine;
pub use invitation::{Invitation, InviteScope, InviteStatus};
pub use mailer::{InviteMailer, RecordingMailer, SentInvitation};
pub use store::{
    CancellationEffects, DefaultReassignment, EdgeRemoval, InviteStore, MemoryInviteStore,
};
