//! Service-account OAuth2 for the Firestore REST API.
//!
//! RS256-signed JWT exchanged at the token endpoint, cached until shortly
//! before expiry.

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use vtb_core::{config::ServiceAccount, errors::Error, Result};

const SCOPE: &str = "https://www.googleapis.com/auth/datastore";
const TOKEN_LIFETIME_SECS: u64 = 3600;
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

pub struct TokenProvider {
    http: reqwest::Client,
    account: ServiceAccount,
    key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(http: reqwest::Client, account: ServiceAccount) -> Result<Self> {
        let key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())
            .map_err(|e| Error::Config(format!("invalid service account private key: {e}")))?;
        Ok(Self {
            http,
            account,
            key,
            cached: Mutex::new(None),
        })
    }

    /// Current access token, refreshed when the cached one is near expiry.
    pub async fn token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(c) = cached.as_ref() {
            if Instant::now() + REFRESH_MARGIN < c.expires_at {
                return Ok(c.token.clone());
            }
        }

        let fresh = self.fetch_token().await?;
        let token = fresh.access_token.clone();
        *cached = Some(CachedToken {
            token: fresh.access_token,
            expires_at: Instant::now() + Duration::from_secs(fresh.expires_in),
        });
        tracing::debug!("firestore access token refreshed");
        Ok(token)
    }

    async fn fetch_token(&self) -> Result<TokenResponse> {
        let iat = chrono::Utc::now().timestamp() as u64;
        let claims = Claims {
            iss: &self.account.client_email,
            scope: SCOPE,
            aud: &self.account.token_uri,
            iat,
            exp: iat + TOKEN_LIFETIME_SECS,
        };

        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map_err(|e| Error::Store(format!("jwt signing failed: {e}")))?;

        let resp = self
            .http
            .post(&self.account.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Store(format!("token request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Store(format!(
                "token exchange failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        resp.json()
            .await
            .map_err(|e| Error::Store(format!("token response decode failed: {e}")))
    }
}
