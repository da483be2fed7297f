//! Admin code-issuance flow: the multi-step `/addcodes` dialog.
//!
//! Linear state machine per admin id: AskCount → AskName → AskLink →
//! Preview, then confirm / regenerate / cancel. Codes only reach the store
//! on confirm, as one all-or-nothing batch.

use std::{collections::BTreeMap, sync::Arc};

use chrono::Utc;

use crate::{
    codes::generate_access_code,
    dialog::{AdminCodeSession, DialogMap, DialogStep},
    domain::{AccessCode, UserId},
    store::DocumentStore,
    Result,
};

/// Largest batch an admin may request in one dialog.
pub const MAX_BATCH_SIZE: u32 = 50;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogStart {
    Unauthorized,
    /// Fresh dialog at AskCount, discarding any prior one.
    Started,
}

/// Result of offering a plain text message to the dialog.
///
/// `NotClaimed` means no active dialog exists for the sender; the caller
/// should fall through to general-purpose text handling.
#[derive(Clone, Debug, PartialEq)]
pub enum TextOutcome {
    NotClaimed,
    /// Count rejected (not a positive integer ≤ 50); step unchanged.
    InvalidCount,
    /// Count accepted; ask for the resource name.
    NamePrompt,
    /// Name accepted; ask for the download link.
    LinkPrompt { name: String },
    /// Link accepted; codes generated, dialog now in Preview.
    Preview(AdminCodeSession),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// No session (expired or already confirmed); safe double-click no-op.
    Expired,
    Committed { count: usize, name: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum RegenerateOutcome {
    Expired,
    Preview(AdminCodeSession),
}

pub struct CodeIssuanceFlow {
    store: Arc<dyn DocumentStore>,
    dialogs: DialogMap,
    admin_id: UserId,
}

impl CodeIssuanceFlow {
    pub fn new(store: Arc<dyn DocumentStore>, admin_id: UserId) -> Self {
        Self {
            store,
            dialogs: DialogMap::new(),
            admin_id,
        }
    }

    pub fn is_admin(&self, user: UserId) -> bool {
        user == self.admin_id
    }

    /// `/addcodes`: the single authorization gate of the whole system.
    pub async fn start(&self, user: UserId) -> DialogStart {
        if !self.is_admin(user) {
            tracing::warn!(user_id = user.0, "unauthorized /addcodes attempt");
            return DialogStart::Unauthorized;
        }
        self.dialogs.set(user, AdminCodeSession::new()).await;
        DialogStart::Started
    }

    /// Offer an inbound text message to the active dialog, if any.
    pub async fn offer_text(&self, user: UserId, text: &str) -> TextOutcome {
        let Some(mut session) = self.dialogs.get(user).await else {
            return TextOutcome::NotClaimed;
        };

        match session.step {
            DialogStep::AskCount => {
                let Some(count) = parse_count(text) else {
                    return TextOutcome::InvalidCount;
                };
                session.count = count;
                session.step = DialogStep::AskName;
                self.dialogs.set(user, session).await;
                TextOutcome::NamePrompt
            }
            DialogStep::AskName => {
                // Raw text, verbatim; rendering escapes it later.
                session.name = text.to_string();
                session.step = DialogStep::AskLink;
                let name = session.name.clone();
                self.dialogs.set(user, session).await;
                TextOutcome::LinkPrompt { name }
            }
            DialogStep::AskLink => {
                session.link = text.to_string();
                session.codes = (0..session.count).map(|_| generate_access_code()).collect();
                session.step = DialogStep::Preview;
                self.dialogs.set(user, session.clone()).await;
                TextOutcome::Preview(session)
            }
            // Text during Preview is not part of the dialog; the buttons are.
            DialogStep::Preview => TextOutcome::NotClaimed,
        }
    }

    /// Commit the previewed batch. On store failure the session is kept
    /// intact so confirm can be retried with the same codes.
    pub async fn confirm(&self, user: UserId) -> Result<ConfirmOutcome> {
        let Some(session) = self.dialogs.get(user).await else {
            return Ok(ConfirmOutcome::Expired);
        };
        if session.step != DialogStep::Preview {
            return Ok(ConfirmOutcome::Expired);
        }

        let now = Utc::now();
        let codes: Vec<AccessCode> = session
            .codes
            .iter()
            .map(|code| AccessCode {
                code: code.clone(),
                resource_name: session.name.clone(),
                download_url: session.link.clone(),
                is_used: false,
                created_at: now,
            })
            .collect();
        let count = codes.len();

        self.store.add_access_codes(codes).await?;
        self.dialogs.remove(user).await;

        tracing::info!(count, "access codes committed");
        Ok(ConfirmOutcome::Committed {
            count,
            name: session.name,
        })
    }

    /// Replace the previewed codes in memory; no store interaction.
    pub async fn regenerate(&self, user: UserId) -> RegenerateOutcome {
        let Some(mut session) = self.dialogs.get(user).await else {
            return RegenerateOutcome::Expired;
        };
        if session.step != DialogStep::Preview {
            return RegenerateOutcome::Expired;
        }

        session.codes = (0..session.count).map(|_| generate_access_code()).collect();
        self.dialogs.set(user, session.clone()).await;
        RegenerateOutcome::Preview(session)
    }

    /// Discard the dialog unconditionally; no store interaction.
    pub async fn cancel(&self, user: UserId) {
        self.dialogs.remove(user).await;
    }

    /// Unused access codes grouped by resource name, for the admin-only
    /// refresh action. Returns `None` for non-admins.
    pub async fn list_unused(&self, user: UserId) -> Result<Option<BTreeMap<String, Vec<String>>>> {
        if !self.is_admin(user) {
            return Ok(None);
        }

        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for code in self.store.list_unused_access_codes().await? {
            grouped.entry(code.resource_name).or_default().push(code.code);
        }
        Ok(Some(grouped))
    }
}

fn parse_count(text: &str) -> Option<u32> {
    let count: u32 = text.trim().parse().ok()?;
    if (1..=MAX_BATCH_SIZE).contains(&count) {
        Some(count)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        codes::is_valid_access_code,
        domain::{OtpSession, PendingVerification, SessionId},
        store::MemoryStore,
        Error,
    };
    use async_trait::async_trait;

    const ADMIN: UserId = UserId(1000);

    fn flow() -> (Arc<MemoryStore>, CodeIssuanceFlow) {
        let store = Arc::new(MemoryStore::new());
        let flow = CodeIssuanceFlow::new(store.clone(), ADMIN);
        (store, flow)
    }

    async fn drive_to_preview(flow: &CodeIssuanceFlow, count: &str) -> AdminCodeSession {
        assert_eq!(flow.start(ADMIN).await, DialogStart::Started);
        assert_eq!(flow.offer_text(ADMIN, count).await, TextOutcome::NamePrompt);
        assert!(matches!(
            flow.offer_text(ADMIN, "Premium Pack").await,
            TextOutcome::LinkPrompt { .. }
        ));
        match flow.offer_text(ADMIN, "http://example.com/x").await {
            TextOutcome::Preview(s) => s,
            other => panic!("expected Preview, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_admin_cannot_start() {
        let (_, flow) = flow();
        assert_eq!(flow.start(UserId(1)).await, DialogStart::Unauthorized);
        assert_eq!(flow.offer_text(UserId(1), "3").await, TextOutcome::NotClaimed);
    }

    #[tokio::test]
    async fn bad_counts_leave_step_unchanged_and_generate_nothing() {
        let (store, flow) = flow();
        flow.start(ADMIN).await;

        for bad in ["0", "51", "abc", "-3", ""] {
            assert_eq!(
                flow.offer_text(ADMIN, bad).await,
                TextOutcome::InvalidCount,
                "count {bad:?} should be rejected"
            );
        }

        // Still at AskCount: a valid count is accepted next.
        assert_eq!(flow.offer_text(ADMIN, "3").await, TextOutcome::NamePrompt);
        assert!(store.access_codes().await.is_empty());
    }

    #[tokio::test]
    async fn full_dialog_commits_exactly_the_previewed_batch() {
        let (store, flow) = flow();
        let preview = drive_to_preview(&flow, "3").await;

        assert_eq!(preview.codes.len(), 3);
        for code in &preview.codes {
            assert!(is_valid_access_code(code), "bad code: {code}");
        }

        let out = flow.confirm(ADMIN).await.unwrap();
        assert_eq!(
            out,
            ConfirmOutcome::Committed {
                count: 3,
                name: "Premium Pack".into()
            }
        );

        let stored = store.access_codes().await;
        assert_eq!(stored.len(), 3);
        for code in &stored {
            assert_eq!(code.resource_name, "Premium Pack");
            assert_eq!(code.download_url, "http://example.com/x");
            assert!(!code.is_used);
        }

        // Session is gone: a second confirm is a safe no-op.
        assert_eq!(flow.confirm(ADMIN).await.unwrap(), ConfirmOutcome::Expired);
        assert_eq!(store.access_codes().await.len(), 3);
    }

    #[tokio::test]
    async fn regenerate_replaces_codes_without_touching_store() {
        let (store, flow) = flow();
        let before = drive_to_preview(&flow, "5").await;

        let RegenerateOutcome::Preview(after) = flow.regenerate(ADMIN).await else {
            panic!("expected a preview");
        };
        assert_eq!(after.codes.len(), 5);
        assert_ne!(after.codes, before.codes);
        assert!(store.access_codes().await.is_empty());
    }

    #[tokio::test]
    async fn cancel_discards_dialog_without_touching_store() {
        let (store, flow) = flow();
        drive_to_preview(&flow, "2").await;

        flow.cancel(ADMIN).await;
        assert_eq!(flow.confirm(ADMIN).await.unwrap(), ConfirmOutcome::Expired);
        assert!(store.access_codes().await.is_empty());
    }

    #[tokio::test]
    async fn restart_overwrites_a_dialog_in_progress() {
        let (_, flow) = flow();
        drive_to_preview(&flow, "2").await;

        assert_eq!(flow.start(ADMIN).await, DialogStart::Started);
        // Back at AskCount.
        assert_eq!(flow.offer_text(ADMIN, "4").await, TextOutcome::NamePrompt);
    }

    #[tokio::test]
    async fn list_unused_groups_by_resource_and_rejects_non_admin() {
        let (_, flow) = flow();
        drive_to_preview(&flow, "2").await;
        flow.confirm(ADMIN).await.unwrap();

        let grouped = flow.list_unused(ADMIN).await.unwrap().unwrap();
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped["Premium Pack"].len(), 2);

        assert!(flow.list_unused(UserId(1)).await.unwrap().is_none());
    }

    /// Store whose batch write always fails; everything else delegates to a
    /// `MemoryStore`.
    struct FailingBatchStore(MemoryStore);

    #[async_trait]
    impl DocumentStore for FailingBatchStore {
        async fn get_pending(&self, user: UserId) -> crate::Result<Option<PendingVerification>> {
            self.0.get_pending(user).await
        }
        async fn put_pending(
            &self,
            user: UserId,
            pending: PendingVerification,
        ) -> crate::Result<()> {
            self.0.put_pending(user, pending).await
        }
        async fn delete_pending(&self, user: UserId) -> crate::Result<()> {
            self.0.delete_pending(user).await
        }
        async fn put_otp_session(
            &self,
            session: &SessionId,
            record: OtpSession,
        ) -> crate::Result<()> {
            self.0.put_otp_session(session, record).await
        }
        async fn add_access_codes(&self, _codes: Vec<AccessCode>) -> crate::Result<()> {
            Err(Error::Store("batch write unavailable".into()))
        }
        async fn list_unused_access_codes(&self) -> crate::Result<Vec<AccessCode>> {
            self.0.list_unused_access_codes().await
        }
    }

    #[tokio::test]
    async fn failed_confirm_keeps_the_session_for_retry() {
        let store = Arc::new(FailingBatchStore(MemoryStore::new()));
        let flow = CodeIssuanceFlow::new(store, ADMIN);

        let preview = drive_to_preview(&flow, "3").await;
        assert!(flow.confirm(ADMIN).await.is_err());

        // Same codes still previewed; regenerate proves the session lives.
        let RegenerateOutcome::Preview(after) = flow.regenerate(ADMIN).await else {
            panic!("session should have survived the failed confirm");
        };
        assert_eq!(after.count, preview.count);
    }
}
