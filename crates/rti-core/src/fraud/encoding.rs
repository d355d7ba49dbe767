//! Canonical base64 encoding for header payloads.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

/// Base64 (standard alphabet, padded) of the RFC 8785 canonical JSON form.
///
/// Keys are sorted and no whitespace is emitted, so equal values always
/// encode to identical strings.
pub fn canonical_base64<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let bytes = serde_jcs::to_vec(value)?;
    Ok(STANDARD.encode(bytes))
}

/// `UTC±HH:MM` for an offset in seconds east of UTC.
pub fn format_utc_offset(offset_secs: i32) -> String {
    let sign = if offset_secs < 0 { '-' } else { '+' };
    let minutes = offset_secs.unsigned_abs() / 60;
    format!("UTC{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
}
