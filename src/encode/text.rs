//! VARCHAR and NVARCHAR payloads.

use crate::config::CodePage;
use crate::error::ValueError;
use crate::value::Value;
use std::borrow::Cow;

/// Text form of a value; non-text scalars use their display form.
fn as_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Text(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}

pub(super) fn varchar(value: &Value, code_page: CodePage) -> Result<Vec<u8>, ValueError> {
    let s = as_text(value);
    match code_page {
        CodePage::Utf8 => Ok(s.as_bytes().to_vec()),
        CodePage::Latin1 => s
            .chars()
            .map(|c| {
                u8::try_from(u32::from(c)).map_err(|_| {
                    ValueError::coercion(format!(
                        "character {:?} (U+{:04X}) cannot be encoded in Latin-1",
                        c,
                        u32::from(c)
                    ))
                })
            })
            .collect(),
    }
}

pub(super) fn nvarchar(value: &Value) -> Vec<u8> {
    as_text(value)
        .encode_utf16()
        .flat_map(u16::to_le_bytes)
        .collect()
}
