//! GEOMETRY (SQLUDT) payloads: raw well-known binary.
//!
//! Accepted inputs are raw bytes (e.g. `geom.STAsBinary()` output) or the same
//! bytes as hex text, with an optional `0x`/`0X` prefix and whitespace between
//! digit pairs. WKT, GeoJSON and other textual forms are rejected.

use crate::error::ValueError;
use crate::value::Value;

/// Characters of the offending value quoted in error messages.
const PREVIEW_CHARS: usize = 80;

/// Decode WKB from hex text.
///
/// # Errors
/// [`ValueError::Malformed`] when the text is not an even-length run of hex digits.
pub fn parse_wkb_hex(text: &str) -> Result<Vec<u8>, ValueError> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let compact: String = digits.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&compact).map_err(|e| {
        let preview: String = text.chars().take(PREVIEW_CHARS).collect();
        ValueError::malformed(format!(
            "invalid geometry value ({}); expected WKB as hex (e.g. '0xE6100000...') or raw bytes, got {:?}",
            e, preview
        ))
    })
}

pub(super) fn wkb(value: &Value) -> Result<Vec<u8>, ValueError> {
    match value {
        Value::Bytes(b) => Ok(b.clone()),
        Value::Text(s) => parse_wkb_hex(s),
        other => Err(ValueError::malformed(format!(
            "invalid type for geometry: expected bytes or hex text, got {}",
            other.kind()
        ))),
    }
}
