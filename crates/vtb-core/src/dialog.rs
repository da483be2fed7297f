//! In-memory admin dialog sessions.
//!
//! Transient by design: a process restart or an explicit cancel discards the
//! dialog, never leaving it partially applied. One active session per admin
//! id; starting a new dialog overwrites the old one.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::UserId;

/// Step of the multi-step code-issuance dialog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogStep {
    AskCount,
    AskName,
    AskLink,
    Preview,
}

/// Per-admin dialog state for the `/addcodes` flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminCodeSession {
    pub step: DialogStep,
    pub count: u32,
    pub name: String,
    pub link: String,
    pub codes: Vec<String>,
}

impl AdminCodeSession {
    pub fn new() -> Self {
        Self {
            step: DialogStep::AskCount,
            count: 0,
            name: String::new(),
            link: String::new(),
            codes: Vec::new(),
        }
    }
}

impl Default for AdminCodeSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Dialog sessions keyed by admin user id, serialized through a single lock.
///
/// Only one admin id is authorized, so contention is near-zero, but the map
/// is shared across handler tasks and needs a concurrency discipline anyway.
#[derive(Default)]
pub struct DialogMap {
    inner: Mutex<HashMap<i64, AdminCodeSession>>,
}

impl DialogMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user: UserId) -> Option<AdminCodeSession> {
        self.inner.lock().await.get(&user.0).cloned()
    }

    pub async fn set(&self, user: UserId, session: AdminCodeSession) {
        self.inner.lock().await.insert(user.0, session);
    }

    pub async fn remove(&self, user: UserId) {
        self.inner.lock().await.remove(&user.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_overwrites_existing_session() {
        let map = DialogMap::new();
        let admin = UserId(99);

        let mut first = AdminCodeSession::new();
        first.count = 3;
        map.set(admin, first).await;

        map.set(admin, AdminCodeSession::new()).await;
        let got = map.get(admin).await.unwrap();
        assert_eq!(got.count, 0);
        assert_eq!(got.step, DialogStep::AskCount);
    }

    #[tokio::test]
    async fn remove_discards_session() {
        let map = DialogMap::new();
        let admin = UserId(99);
        map.set(admin, AdminCodeSession::new()).await;
        map.remove(admin).await;
        assert!(map.get(admin).await.is_none());
    }

    // Flow outcomes carry sessions by value and tests compare them whole,
    // so the session type must be comparable.
    #[test]
    fn fresh_sessions_compare_equal() {
        assert_eq!(AdminCodeSession::new(), AdminCodeSession::default());

        let mut advanced = AdminCodeSession::new();
        advanced.step = DialogStep::Preview;
        assert_ne!(advanced, AdminCodeSession::new());
    }
}
