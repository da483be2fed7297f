//! Domain types shared between the flows, the store port and the adapters.
//!
//! Field names on the persisted structs are a wire contract: the website
//! reads `pending_verifications` and `otp_sessions` documents directly, so
//! they must serialize exactly as written here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Website-issued verification session id (opaque; never generated here).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

/// A user who opened a verification deep link but has not yet shared their
/// phone number. Keyed by Telegram user id; at most one per user, last
/// `/start` wins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingVerification {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
}

/// An issued one-time code, keyed by the website's session id.
///
/// `verified` is flipped by the website after the user enters the code; the
/// bot only ever writes it as `false`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OtpSession {
    pub otp: String,
    pub telegram_id: String,
    pub telegram_name: String,
    pub telegram_username: String,
    pub phone_number: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// A persisted, reusable redemption code tied to a named downloadable
/// resource. Redemption (`isUsed` flipping) happens outside the bot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccessCode {
    pub code: String,
    #[serde(rename = "resourceName")]
    pub resource_name: String,
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
    #[serde(rename = "isUsed")]
    pub is_used: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Placeholder stored when the Telegram account has no public username.
pub const NO_USERNAME: &str = "No Username";

/// Contact card attached to an inbound contact-share message.
#[derive(Clone, Debug)]
pub struct SharedContact {
    /// Telegram account the contact card belongs to, if Telegram knows it.
    /// `None` for phone-book contacts that are not on Telegram.
    pub owner: Option<UserId>,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: Option<String>,
}

impl SharedContact {
    /// Display name as stored in the OTP session: first name, plus the last
    /// name when present.
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.trim().is_empty() => format!("{} {last}", self.first_name),
            _ => self.first_name.clone(),
        }
    }
}
