//! Verification flow: pending verification → contact share → OTP issuance.

use std::sync::Arc;

use chrono::Utc;

use crate::{
    codes::generate_otp,
    domain::{OtpSession, PendingVerification, SessionId, SharedContact, UserId, NO_USERNAME},
    store::DocumentStore,
    Result,
};

/// Outcome of a `/start` invocation; the adapter decides how to render it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    /// No deep-link payload: plain welcome, nothing stored.
    Welcome,
    /// Pending verification recorded; prompt for a one-tap contact share.
    ContactRequested,
}

/// Outcome of a contact-share event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContactOutcome {
    /// The shared contact card does not belong to the sender (forwarded
    /// contact). Nothing is stored.
    OwnerMismatch,
    /// No pending verification for this user: expired, never started, or
    /// already consumed. Replay-safe no-op.
    SessionExpired,
    /// OTP issued and stored under the website's session id.
    OtpIssued { code: String },
}

pub struct VerificationFlow {
    store: Arc<dyn DocumentStore>,
}

impl VerificationFlow {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Handle `/start [payload]`.
    ///
    /// A present payload is the website's session id; it is stored verbatim,
    /// overwriting any prior pending record for the user (last `/start`
    /// wins).
    pub async fn handle_start(&self, user: UserId, payload: Option<&str>) -> Result<StartOutcome> {
        let Some(session_id) = payload.map(str::trim).filter(|p| !p.is_empty()) else {
            return Ok(StartOutcome::Welcome);
        };

        self.store
            .put_pending(
                user,
                PendingVerification {
                    session_id: session_id.to_string(),
                    created_at: Utc::now(),
                },
            )
            .await?;

        tracing::info!(user_id = user.0, "pending verification recorded");
        Ok(StartOutcome::ContactRequested)
    }

    /// Handle a contact-share event.
    ///
    /// The OTP session write is sequenced before the pending-record delete:
    /// a crash between the two leaves the pending record behind, and a
    /// retried contact share regenerates a fresh OTP under the same session
    /// id. Duplicate delivery is tolerated, the OTP value itself is not
    /// stable across retries.
    pub async fn handle_contact(
        &self,
        user: UserId,
        contact: &SharedContact,
        username: Option<&str>,
    ) -> Result<ContactOutcome> {
        if contact.owner != Some(user) {
            tracing::warn!(user_id = user.0, "contact share owner mismatch");
            return Ok(ContactOutcome::OwnerMismatch);
        }

        let Some(pending) = self.store.get_pending(user).await? else {
            tracing::debug!(user_id = user.0, "contact share without pending session");
            return Ok(ContactOutcome::SessionExpired);
        };

        let code = generate_otp();
        let session = SessionId(pending.session_id.clone());
        let record = OtpSession {
            otp: code.clone(),
            telegram_id: user.0.to_string(),
            telegram_name: contact.display_name(),
            telegram_username: username
                .filter(|u| !u.trim().is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| NO_USERNAME.to_string()),
            phone_number: contact.phone_number.clone(),
            verified: false,
            created_at: Utc::now(),
        };

        self.store.put_otp_session(&session, record).await?;
        self.store.delete_pending(user).await?;

        tracing::info!(user_id = user.0, "otp issued");
        Ok(ContactOutcome::OtpIssued { code })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn flow() -> (Arc<MemoryStore>, VerificationFlow) {
        let store = Arc::new(MemoryStore::new());
        let flow = VerificationFlow::new(store.clone());
        (store, flow)
    }

    fn own_contact(user: UserId) -> SharedContact {
        SharedContact {
            owner: Some(user),
            phone_number: "+15551234567".into(),
            first_name: "Ada".into(),
            last_name: Some("Lovelace".into()),
        }
    }

    #[tokio::test]
    async fn start_then_contact_issues_one_otp_and_consumes_pending() {
        let (store, flow) = flow();
        let user = UserId(42);

        let out = flow.handle_start(user, Some("sess-1")).await.unwrap();
        assert_eq!(out, StartOutcome::ContactRequested);

        let out = flow
            .handle_contact(user, &own_contact(user), Some("ada"))
            .await
            .unwrap();
        let ContactOutcome::OtpIssued { code } = out else {
            panic!("expected OtpIssued, got {out:?}");
        };

        let session = store
            .otp_session(&SessionId("sess-1".into()))
            .await
            .expect("otp session stored at the website's key");
        assert_eq!(session.otp, code);
        assert_eq!(session.telegram_id, "42");
        assert_eq!(session.telegram_name, "Ada Lovelace");
        assert_eq!(session.telegram_username, "ada");
        assert_eq!(session.phone_number, "+15551234567");
        assert!(!session.verified);
        assert_eq!(store.pending_count().await, 0);
    }

    #[tokio::test]
    async fn start_without_payload_stores_nothing() {
        let (store, flow) = flow();

        assert_eq!(
            flow.handle_start(UserId(1), None).await.unwrap(),
            StartOutcome::Welcome
        );
        assert_eq!(
            flow.handle_start(UserId(1), Some("")).await.unwrap(),
            StartOutcome::Welcome
        );
        assert_eq!(
            flow.handle_start(UserId(1), Some("   ")).await.unwrap(),
            StartOutcome::Welcome
        );
        assert_eq!(store.pending_count().await, 0);
    }

    #[tokio::test]
    async fn second_start_overwrites_pending_session() {
        let (store, flow) = flow();
        let user = UserId(5);

        flow.handle_start(user, Some("first")).await.unwrap();
        flow.handle_start(user, Some("second")).await.unwrap();

        let pending = store.get_pending(user).await.unwrap().unwrap();
        assert_eq!(pending.session_id, "second");
        assert_eq!(store.pending_count().await, 1);
    }

    #[tokio::test]
    async fn forwarded_contact_never_mutates_store() {
        let (store, flow) = flow();
        let user = UserId(10);
        flow.handle_start(user, Some("sess")).await.unwrap();

        let mut someone_else = own_contact(user);
        someone_else.owner = Some(UserId(11));
        let out = flow
            .handle_contact(user, &someone_else, None)
            .await
            .unwrap();
        assert_eq!(out, ContactOutcome::OwnerMismatch);

        // Phone-book contacts without a Telegram account are rejected too.
        let mut unlinked = own_contact(user);
        unlinked.owner = None;
        let out = flow.handle_contact(user, &unlinked, None).await.unwrap();
        assert_eq!(out, ContactOutcome::OwnerMismatch);

        assert_eq!(store.pending_count().await, 1);
        assert!(store.otp_session(&SessionId("sess".into())).await.is_none());
    }

    #[tokio::test]
    async fn contact_without_pending_is_a_noop() {
        let (store, flow) = flow();
        let user = UserId(20);

        let out = flow
            .handle_contact(user, &own_contact(user), None)
            .await
            .unwrap();
        assert_eq!(out, ContactOutcome::SessionExpired);
        assert_eq!(store.pending_count().await, 0);
    }

    #[tokio::test]
    async fn replayed_contact_after_success_is_a_noop() {
        let (store, flow) = flow();
        let user = UserId(30);
        flow.handle_start(user, Some("sess")).await.unwrap();

        let first = flow
            .handle_contact(user, &own_contact(user), None)
            .await
            .unwrap();
        assert!(matches!(first, ContactOutcome::OtpIssued { .. }));

        let second = flow
            .handle_contact(user, &own_contact(user), None)
            .await
            .unwrap();
        assert_eq!(second, ContactOutcome::SessionExpired);

        // The stored OTP session survives the replay untouched.
        assert!(store.otp_session(&SessionId("sess".into())).await.is_some());
    }

    #[tokio::test]
    async fn missing_username_gets_placeholder() {
        let (store, flow) = flow();
        let user = UserId(50);
        flow.handle_start(user, Some("sess")).await.unwrap();

        flow.handle_contact(user, &own_contact(user), None)
            .await
            .unwrap();

        let session = store
            .otp_session(&SessionId("sess".into()))
            .await
            .unwrap();
        assert_eq!(session.telegram_username, NO_USERNAME);
    }
}
