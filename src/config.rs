//! Options for encoding and format-file generation.

use serde::{Deserialize, Serialize};

/// Collation attached to character fields when none is configured.
pub const DEFAULT_COLLATION: &str = "SQL_Latin1_General_CP1_CI_AS";

/// Byte encoding used for VARCHAR payloads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodePage {
    /// ISO-8859-1: one byte per character, U+0000..=U+00FF only.
    #[default]
    Latin1,
    /// UTF-8, for columns with a `_UTF8` collation.
    Utf8,
}

/// Configuration for an encode/describe call.
///
/// # Example
/// ```
/// use bcpnative::config::{CodePage, EncodeOptions};
///
/// let opts = EncodeOptions {
///     code_page: CodePage::Utf8,
///     collation: "Latin1_General_100_CI_AS_SC_UTF8".into(),
///     ..Default::default()
/// };
/// assert!(!opts.parallel);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Encoding for VARCHAR payloads.
    pub code_page: CodePage,
    /// COLLATION written on CharPrefix/NCharPrefix fields.
    pub collation: String,
    /// Encode columns and assemble rows on the rayon pool.
    /// Output is byte-identical to the sequential path.
    pub parallel: bool,
    /// Row chunks for parallel assembly. `None` means `2 * num_cpus`.
    pub shards: Option<usize>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            code_page: CodePage::Latin1,
            collation: DEFAULT_COLLATION.to_string(),
            parallel: false,
            shards: None,
        }
    }
}
