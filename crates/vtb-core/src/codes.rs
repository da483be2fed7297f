//! One-time code and access-code generators.

use rand::Rng;

/// Prefix carried by every generated access code.
pub const ACCESS_CODE_PREFIX: &str = "REDM-";

const BASE36: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// 6-digit numeric OTP, uniform over 100000–999999.
///
/// Returned as a string: the range never produces a leading zero today, but
/// the stored value is a string so a future key-space change cannot silently
/// truncate display.
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Access code: `REDM-` + 6 uppercase base-36 characters.
///
/// Uniqueness within a batch is not checked; at 36^6 combinations the
/// collision odds for a batch of at most 50 are accepted.
pub fn generate_access_code() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{ACCESS_CODE_PREFIX}{suffix}")
}

/// `true` when `code` matches `REDM-` + 6 uppercase base-36 characters.
pub fn is_valid_access_code(code: &str) -> bool {
    let Some(suffix) = code.strip_prefix(ACCESS_CODE_PREFIX) else {
        return false;
    };
    suffix.len() == 6
        && suffix
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}
