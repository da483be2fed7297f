//! Document-store port and the in-memory implementation.
//!
//! The flows only ever see this trait; Firestore lives in an adapter crate.
//! Two operations carry atomicity requirements the adapters must honor:
//! `put_otp_session` / `put_pending` are single-document upserts (atomic per
//! document), and `add_access_codes` is an all-or-nothing batch.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{AccessCode, OtpSession, PendingVerification, SessionId, UserId},
    Result,
};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_pending(&self, user: UserId) -> Result<Option<PendingVerification>>;

    /// Atomic upsert; overwrites any prior pending record for the user.
    async fn put_pending(&self, user: UserId, pending: PendingVerification) -> Result<()>;

    /// Deleting a missing record is a no-op, not an error.
    async fn delete_pending(&self, user: UserId) -> Result<()>;

    /// Atomic upsert keyed by the website's session id; a retried contact
    /// share fully overwrites the previous record.
    async fn put_otp_session(&self, session: &SessionId, record: OtpSession) -> Result<()>;

    /// All-or-nothing batch write; a partial batch must never land.
    async fn add_access_codes(&self, codes: Vec<AccessCode>) -> Result<()>;

    async fn list_unused_access_codes(&self) -> Result<Vec<AccessCode>>;
}

#[derive(Default)]
struct MemoryInner {
    pending: HashMap<i64, PendingVerification>,
    otp_sessions: HashMap<String, OtpSession>,
    access_codes: Vec<AccessCode>,
}

/// In-process store used by tests and local runs.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspection helper: the OTP session stored at `session`, if any.
    pub async fn otp_session(&self, session: &SessionId) -> Option<OtpSession> {
        self.inner.lock().await.otp_sessions.get(&session.0).cloned()
    }

    /// Inspection helper: number of pending verifications.
    pub async fn pending_count(&self) -> usize {
        self.inner.lock().await.pending.len()
    }

    /// Inspection helper: every stored access code, in insertion order.
    pub async fn access_codes(&self) -> Vec<AccessCode> {
        self.inner.lock().await.access_codes.clone()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_pending(&self, user: UserId) -> Result<Option<PendingVerification>> {
        Ok(self.inner.lock().await.pending.get(&user.0).cloned())
    }

    async fn put_pending(&self, user: UserId, pending: PendingVerification) -> Result<()> {
        self.inner.lock().await.pending.insert(user.0, pending);
        Ok(())
    }

    async fn delete_pending(&self, user: UserId) -> Result<()> {
        self.inner.lock().await.pending.remove(&user.0);
        Ok(())
    }

    async fn put_otp_session(&self, session: &SessionId, record: OtpSession) -> Result<()> {
        self.inner
            .lock()
            .await
            .otp_sessions
            .insert(session.0.clone(), record);
        Ok(())
    }

    async fn add_access_codes(&self, codes: Vec<AccessCode>) -> Result<()> {
        self.inner.lock().await.access_codes.extend(codes);
        Ok(())
    }

    async fn list_unused_access_codes(&self) -> Result<Vec<AccessCode>> {
        Ok(self
            .inner
            .lock()
            .await
            .access_codes
            .iter()
            .filter(|c| !c.is_used)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn pending(session: &str) -> PendingVerification {
        PendingVerification {
            session_id: session.to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn put_pending_overwrites_previous() {
        let store = MemoryStore::new();
        let user = UserId(7);

        store.put_pending(user, pending("a")).await.unwrap();
        store.put_pending(user, pending("b")).await.unwrap();

        let got = store.get_pending(user).await.unwrap().unwrap();
        assert_eq!(got.session_id, "b");
        assert_eq!(store.pending_count().await, 1);
    }

    #[tokio::test]
    async fn delete_missing_pending_is_noop() {
        let store = MemoryStore::new();
        store.delete_pending(UserId(1)).await.unwrap();
    }

    #[tokio::test]
    async fn unused_filter_skips_used_codes() {
        let store = MemoryStore::new();
        let mut used = AccessCode {
            code: "REDM-AAAAAA".into(),
            resource_name: "Pack".into(),
            download_url: "http://example.com".into(),
            is_used: false,
            created_at: Utc::now(),
        };
        let fresh = AccessCode {
            code: "REDM-BBBBBB".into(),
            ..used.clone()
        };
        used.is_used = true;

        store.add_access_codes(vec![used, fresh]).await.unwrap();

        let unused = store.list_unused_access_codes().await.unwrap();
        assert_eq!(unused.len(), 1);
        assert_eq!(unused[0].code, "REDM-BBBBBB");
    }
}
