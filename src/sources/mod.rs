// SPDX-License-Identifier: GPL-3.0-or-later

//! Data sources for distribution identification.
//!
//! Three independent sources feed one probe: the standardized
//! `/etc/os-release` file, the output of the external `lsb_release`
//! command, and the pre-standardization `/etc/<name>-release` files.
//! Each source module turns raw text into an [`AttrMap`]; precedence
//! between the sources is resolved later, in [`crate::probe`].
//!
//! Error taxonomy at this boundary:
//!
//! * A source that is missing or unreadable is **not** an error — it
//!   produces an empty mapping and field resolution degrades to the
//!   next source.
//! * Content that is not valid UTF-8 is a hard error. The parsers only
//!   ever see decoded text.

pub mod distro_release;
pub mod lsb_release;
pub mod os_release;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Attribute mapping produced by each source parser.
///
/// Keys are lower-cased; absence of a key is distinct from an empty
/// value (an empty value still counts as "this source answered").
pub type AttrMap = HashMap<String, String>;

/// Read a whole text file, treating any I/O failure as an absent source.
///
/// Returns `Ok(None)` when the file does not exist or cannot be read.
/// Invalid UTF-8 is the one hard error: the parsers must never see
/// undecoded bytes.
pub(crate) fn read_text(path: &Path) -> Result<Option<String>> {
    match fs::read(path) {
        Ok(bytes) => {
            let text = String::from_utf8(bytes)
                .with_context(|| format!("{} is not valid UTF-8", path.display()))?;
            Ok(Some(text))
        }
        Err(_) => Ok(None),
    }
}

/// Read only the first line of a text file.
///
/// Legacy release files are single-line by convention; multi-line
/// variants (some SUSE releases) are truncated to line 1 here so the
/// line parser never sees the rest.
pub(crate) fn read_first_line(path: &Path) -> Result<Option<String>> {
    let text = read_text(path)?;
    Ok(text.map(|t| t.lines().next().unwrap_or("").to_string()))
}
