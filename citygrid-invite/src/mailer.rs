//! Outbound invitation mail boundary
//!
//! Email delivery is an external collaborator: the engine hands the
//! minted token and acceptance URL to an `InviteMailer` and never looks
//! at delivery again. The recording implementation backs tests and local
//! development.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use citygrid_auth::AuthResult;

use crate::invitation::Invitation;

/// Delivers invitation email.
#[async_trait]
pub trait InviteMailer: Send + Sync {
    /// Send an invitation (or re-send one after a resend).
    ///
    /// # Arguments
    ///
    /// * `invitation` - The invitation being delivered
    /// * `token` - The signed acceptance token
    /// * `accept_url` - Fully-formed acceptance link
    async fn send_invitation(
        &self,
        invitation: &Invitation,
        token: &str,
        accept_url: &str,
    ) -> AuthResult<()>;
}

/// A delivery captured by [`RecordingMailer`].
#[derive(Debug, Clone)]
pub struct SentInvitation {
    /// Invitation ID
    pub invitation_id: Uuid,
    /// Recipient email
    pub email: String,
    /// The signed token that was delivered
    pub token: String,
    /// The acceptance link that was delivered
    pub accept_url: String,
}

/// Mailer that records deliveries instead of sending them.
#[derive(Default)]
pub struct RecordingMailer {
    sent: RwLock<Vec<SentInvitation>>,
}

impl RecordingMailer {
    /// Create an empty recording mailer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty recording mailer wrapped in an `Arc`.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Every delivery recorded so far, oldest first.
    pub async fn sent(&self) -> Vec<SentInvitation> {
        self.sent.read().await.clone()
    }

    /// Number of recorded deliveries.
    pub async fn sent_count(&self) -> usize {
        self.sent.read().await.len()
    }
}

#[async_trait]
impl InviteMailer for RecordingMailer {
    async fn send_invitation(
        &self,
        invitation: &Invitation,
        token: &str,
        accept_url: &str,
    ) -> AuthResult<()> {
        self.sent.write().await.push(SentInvitation {
            invitation_id: invitation.id,
            email: invitation.email.clone(),
            token: token.to_string(),
            accept_url: accept_url.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invitation::InviteScope;

    #[tokio::test]
    async fn test_recording_mailer_captures_deliveries() {
        let mailer = RecordingMailer::new();
        let invitation = Invitation::new(
            InviteScope::City(Uuid::now_v7()),
            "maria@example.com",
            Uuid::now_v7(),
        );

        mailer
            .send_invitation(&invitation, "token-a", "https://example.test/accept")
            .await
            .unwrap();

        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].invitation_id, invitation.id);
        assert_eq!(sent[0].email, "maria@example.com");
        assert_eq!(sent[0].token, "token-a");
    }
}
