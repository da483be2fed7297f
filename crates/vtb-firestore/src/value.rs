//! Mapping between domain documents and Firestore's typed-value JSON.
//!
//! Hand-written per collection: there are only three document shapes and
//! their field names are a wire contract the website reads directly.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

use vtb_core::{
    domain::{AccessCode, OtpSession, PendingVerification},
    errors::Error,
    Result,
};

fn string_value(s: &str) -> Value {
    json!({ "stringValue": s })
}

fn bool_value(b: bool) -> Value {
    json!({ "booleanValue": b })
}

fn timestamp_value(t: DateTime<Utc>) -> Value {
    // Protobuf JSON timestamps want the Z offset.
    json!({ "timestampValue": t.to_rfc3339_opts(SecondsFormat::Micros, true) })
}

pub fn pending_fields(p: &PendingVerification) -> Value {
    json!({
        "session_id": string_value(&p.session_id),
        "created_at": timestamp_value(p.created_at),
    })
}

pub fn otp_session_fields(s: &OtpSession) -> Value {
    json!({
        "otp": string_value(&s.otp),
        "telegram_id": string_value(&s.telegram_id),
        "telegram_name": string_value(&s.telegram_name),
        "telegram_username": string_value(&s.telegram_username),
        "phone_number": string_value(&s.phone_number),
        "verified": bool_value(s.verified),
        "created_at": timestamp_value(s.created_at),
    })
}

pub fn access_code_fields(c: &AccessCode) -> Value {
    json!({
        "code": string_value(&c.code),
        "resourceName": string_value(&c.resource_name),
        "downloadUrl": string_value(&c.download_url),
        "isUsed": bool_value(c.is_used),
        "createdAt": timestamp_value(c.created_at),
    })
}

fn get_string(fields: &Value, key: &str) -> Result<String> {
    fields
        .get(key)
        .and_then(|v| v.get("stringValue"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| Error::Store(format!("document missing string field {key}")))
}

fn get_bool(fields: &Value, key: &str) -> Result<bool> {
    fields
        .get(key)
        .and_then(|v| v.get("booleanValue"))
        .and_then(|v| v.as_bool())
        .ok_or_else(|| Error::Store(format!("document missing boolean field {key}")))
}

fn get_timestamp(fields: &Value, key: &str) -> Result<DateTime<Utc>> {
    let raw = fields
        .get(key)
        .and_then(|v| v.get("timestampValue"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::Store(format!("document missing timestamp field {key}")))?;

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Store(format!("bad timestamp in field {key}: {e}")))
}

pub fn decode_pending(fields: &Value) -> Result<PendingVerification> {
    Ok(PendingVerification {
        session_id: get_string(fields, "session_id")?,
        created_at: get_timestamp(fields, "created_at")?,
    })
}

pub fn decode_access_code(fields: &Value) -> Result<AccessCode> {
    Ok(AccessCode {
        code: get_string(fields, "code")?,
        resource_name: get_string(fields, "resourceName")?,
        download_url: get_string(fields, "downloadUrl")?,
        is_used: get_bool(fields, "isUsed")?,
        created_at: get_timestamp(fields, "createdAt")?,
    })
}
