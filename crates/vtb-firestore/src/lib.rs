//! Firestore adapter implementing the `vtb-core` document-store port.
//!
//! Everything goes through the REST API. Single-document upserts and the
//! access-code batch both use `:commit`, which Firestore applies atomically;
//! a partial batch can never land.

use async_trait::async_trait;
use rand::Rng;
use serde_json::{json, Value};

use vtb_core::{
    config::Config,
    domain::{AccessCode, OtpSession, PendingVerification, SessionId, UserId},
    errors::Error,
    store::DocumentStore,
    Result,
};

mod auth;
mod value;

use auth::TokenProvider;

const API_BASE: &str = "https://firestore.googleapis.com/v1";

const PENDING_COLLECTION: &str = "pending_verifications";
const OTP_COLLECTION: &str = "otp_sessions";
const ACCESS_CODE_COLLECTION: &str = "access_codes";

pub struct FirestoreStore {
    http: reqwest::Client,
    auth: TokenProvider,
    /// `projects/{project}/databases/(default)/documents`
    documents_root: String,
}

impl FirestoreStore {
    pub fn new(cfg: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| Error::External(format!("http client build failed: {e}")))?;

        let auth = TokenProvider::new(http.clone(), cfg.service_account.clone())?;
        let documents_root = format!(
            "projects/{}/databases/(default)/documents",
            cfg.firebase_project_id
        );

        Ok(Self {
            http,
            auth,
            documents_root,
        })
    }

    fn doc_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{collection}/{id}", self.documents_root)
    }

    /// Atomic commit of one or more writes.
    async fn commit(&self, writes: Vec<Value>) -> Result<()> {
        let token = self.auth.token().await?;
        let url = format!("{API_BASE}/{}:commit", self.documents_root);

        let resp = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&json!({ "writes": writes }))
            .send()
            .await
            .map_err(|e| Error::Store(format!("commit request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Store(format!(
                "commit failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }
        Ok(())
    }

    /// Fields of a document, or `None` on 404.
    async fn get_fields(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let token = self.auth.token().await?;
        let url = format!("{API_BASE}/{}", self.doc_name(collection, id));

        let resp = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Error::Store(format!("document get failed: {e}")))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Store(format!(
                "document get failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let doc: Value = resp
            .json()
            .await
            .map_err(|e| Error::Store(format!("document decode failed: {e}")))?;
        Ok(doc.get("fields").cloned())
    }
}

/// Client-generated document id, Firestore SDK style (20 alphanumerics).
fn auto_id() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..20)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn get_pending(&self, user: UserId) -> Result<Option<PendingVerification>> {
        match self
            .get_fields(PENDING_COLLECTION, &user.0.to_string())
            .await?
        {
            Some(fields) => Ok(Some(value::decode_pending(&fields)?)),
            None => Ok(None),
        }
    }

    async fn put_pending(&self, user: UserId, pending: PendingVerification) -> Result<()> {
        self.commit(vec![json!({
            "update": {
                "name": self.doc_name(PENDING_COLLECTION, &user.0.to_string()),
                "fields": value::pending_fields(&pending),
            }
        })])
        .await
    }

    async fn delete_pending(&self, user: UserId) -> Result<()> {
        // Deleting a missing document succeeds; that matches the port.
        self.commit(vec![json!({
            "delete": self.doc_name(PENDING_COLLECTION, &user.0.to_string()),
        })])
        .await
    }

    async fn put_otp_session(&self, session: &SessionId, record: OtpSession) -> Result<()> {
        self.commit(vec![json!({
            "update": {
                "name": self.doc_name(OTP_COLLECTION, &session.0),
                "fields": value::otp_session_fields(&record),
            }
        })])
        .await
    }

    async fn add_access_codes(&self, codes: Vec<AccessCode>) -> Result<()> {
        let writes: Vec<Value> = codes
            .iter()
            .map(|code| {
                json!({
                    "update": {
                        "name": self.doc_name(ACCESS_CODE_COLLECTION, &auto_id()),
                        "fields": value::access_code_fields(code),
                    }
                })
            })
            .collect();
        self.commit(writes).await
    }

    async fn list_unused_access_codes(&self) -> Result<Vec<AccessCode>> {
        let token = self.auth.token().await?;
        let url = format!("{API_BASE}/{}:runQuery", self.documents_root);

        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": ACCESS_CODE_COLLECTION }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": "isUsed" },
                        "op": "EQUAL",
                        "value": { "booleanValue": false },
                    }
                },
            }
        });

        let resp = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Store(format!("query request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::Store(format!(
                "query failed: {status} {}",
                text.chars().take(200).collect::<String>()
            )));
        }

        // runQuery streams one JSON object per matched document.
        let rows: Vec<Value> = resp
            .json()
            .await
            .map_err(|e| Error::Store(format!("query decode failed: {e}")))?;

        let mut out = Vec::new();
        for row in rows {
            let Some(fields) = row.get("document").and_then(|d| d.get("fields")) else {
                continue; // trailing readTime-only rows
            };
            out.push(value::decode_access_code(fields)?);
        }
        Ok(out)
    }
}
