//! File I/O around the core encoders.
//!
//! - [`native`]: write a `.dat` payload and its `.xml` format file
//! - [`text`]: write a delimited character-mode data file (feature `io-csv`)
//! - [`jsonl`]: read a row-set from JSON Lines (feature `io-jsonl`)

pub mod native;

#[cfg_attr(docsrs, doc(cfg(feature = "io-jsonl")))]
#[cfg(feature = "io-jsonl")]
pub mod jsonl;

#[cfg_attr(docsrs, doc(cfg(feature = "io-csv")))]
#[cfg(feature = "io-csv")]
pub mod text;

use anyhow::{Context, Result};
use std::fs::create_dir_all;
use std::path::Path;

/// Create `path`'s parent directory if it has one.
pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    Ok(())
}
